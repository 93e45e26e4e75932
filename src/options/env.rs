use crate::error::{Error, Result};

use super::ConnectParams;

const HOST: &str = "MYSQL_TEST_HOST";
const USER: &str = "MYSQL_TEST_USER";
const PASSWD: &str = "MYSQL_TEST_PASSWD";
const DB: &str = "MYSQL_TEST_DB";
const PORT: &str = "MYSQL_TEST_PORT";
const SOCKET: &str = "MYSQL_TEST_SOCKET";

const DATABASE_URL: &str = "DATABASE_URL";

impl ConnectParams {
    /// Reads connection parameters from the environment (and a `.env` file, if present).
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `MYSQL_TEST_HOST` | `localhost` |
    /// | `MYSQL_TEST_USER` | `root` |
    /// | `MYSQL_TEST_PASSWD` | (none) |
    /// | `MYSQL_TEST_DB` | `test` |
    /// | `MYSQL_TEST_PORT` | `3306` |
    /// | `MYSQL_TEST_SOCKET` | (none) |
    ///
    /// When none of these are set but `DATABASE_URL` is, that URL is parsed instead.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| dotenvy::var(key).ok())
    }

    pub(crate) fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let any_set = [HOST, USER, PASSWD, DB, PORT, SOCKET]
            .iter()
            .any(|key| var(key).is_some());

        if !any_set {
            if let Some(url) = var(DATABASE_URL) {
                return url.parse();
            }
        }

        let mut params = Self::new();

        if let Some(host) = var(HOST) {
            params = params.host(&host);
        }

        if let Some(user) = var(USER) {
            params = params.user(&user);
        }

        if let Some(passwd) = var(PASSWD) {
            params = params.passwd(&passwd);
        }

        if let Some(db) = var(DB) {
            params = params.db(&db);
        }

        if let Some(port) = var(PORT) {
            let port = port
                .trim()
                .parse()
                .map_err(|_| Error::Configuration(format!("{PORT} is not a valid port: {port:?}")))?;

            params = params.port(port);
        }

        if let Some(socket) = var(SOCKET).filter(|socket| !socket.is_empty()) {
            params = params.socket(socket);
        }

        Ok(params)
    }
}
