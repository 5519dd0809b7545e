/// Authentication Transaction Module
///
/// Looks a user up by name and salted password hash in a single query. The
/// handler's terminal status decides everything: a user is authenticated only
/// when the transaction was committed and a row came back, and authorized only
/// when additionally the authorization check accepts that row.
use crate::core::db::connection::Connector;
use crate::core::db::parameters::Parameters;
use crate::core::db::transaction::{TransactionHandler, TransactionStrategy, TransactionType};
use crate::core::Result;
use crate::model::{Nullable, ResultSet, Row};

/// Lookup against `users(username, password_salt, password_hash, role)`.
pub const DEFAULT_LOOKUP_SQL: &str = "\
    SELECT id, username, role
    FROM users
    WHERE username = @username
      AND password_hash = dal_password_hash(password_salt, @password)";

/// Decides whether an authenticated user's row grants access.
pub type Authorizer = Box<dyn Fn(&Row) -> bool + Send + Sync>;

pub struct AuthenticationTransaction {
    username: String,
    password: String,
    lookup_sql: String,
    authorizer: Authorizer,
}

impl std::fmt::Debug for AuthenticationTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationTransaction")
            .field("username", &self.username)
            .field("lookup_sql", &self.lookup_sql)
            .finish_non_exhaustive()
    }
}

impl AuthenticationTransaction {
    /// Uses `DEFAULT_LOOKUP_SQL`; any user with a non-null role is authorized.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        AuthenticationTransaction {
            username: username.into(),
            password: password.into(),
            lookup_sql: DEFAULT_LOOKUP_SQL.to_string(),
            authorizer: Box::new(|row| row.entry("role").map(|e| !e.is_null()).unwrap_or(false)),
        }
    }

    /// Replaces the lookup query. It must bind `@username` and `@password`.
    pub fn with_lookup_sql(mut self, sql: impl Into<String>) -> Self {
        self.lookup_sql = sql.into();
        self
    }

    /// Authorizes only users whose `role` is exactly `role`.
    pub fn requiring_role(self, role: impl Into<String>) -> Self {
        let role = role.into();
        self.authorized_by(move |row| {
            row.entry("role")
                .map(|e| e.has_value(&role))
                .unwrap_or(false)
        })
    }

    pub fn authorized_by<F>(mut self, authorizer: F) -> Self
    where
        F: Fn(&Row) -> bool + Send + Sync + 'static,
    {
        self.authorizer = Box::new(authorizer);
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl TransactionStrategy for AuthenticationTransaction {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::Authentication
    }

    fn execute(&mut self, connector: &Connector) -> Result<ResultSet> {
        let parameters = Parameters::new()
            .with("@username", self.username.as_str())?
            .with("@password", self.password.as_str())?;
        connector.get_data(&self.lookup_sql, Some(&parameters))
    }
}

impl TransactionHandler<'_, AuthenticationTransaction> {
    /// The matched user's row, once the transaction has been committed.
    fn authenticated_row(&self) -> Option<&Row> {
        if !self.is_committed() || !self.status().is_success() {
            return None;
        }
        self.result().and_then(ResultSet::first)
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated_row().is_some()
    }

    pub fn is_authorized(&self) -> bool {
        self.authenticated_row()
            .map(|row| (self.strategy().authorizer)(row))
            .unwrap_or(false)
    }
}

/// Runs the authentication lookup, commits it, and reports
/// `(is_authenticated, is_authorized)`.
pub fn authenticate(
    connector: &mut Connector,
    transaction: AuthenticationTransaction,
) -> Result<(bool, bool)> {
    let mut handler = TransactionHandler::new(connector, transaction);
    handler.execute_transaction()?;
    handler.complete();
    Ok((handler.is_authenticated(), handler.is_authorized()))
}
