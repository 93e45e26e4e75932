use std::str::FromStr;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::Error;

use super::ConnectParams;

impl ConnectParams {
    pub(crate) fn parse_from_url(url: &Url) -> Result<Self, Error> {
        if url.scheme() != "mysql" && url.scheme() != "mariadb" {
            return Err(Error::Configuration(format!(
                "unsupported URL scheme: {:?}",
                url.scheme()
            )));
        }

        let mut params = Self::new();

        if let Some(host) = url.host_str() {
            params = params.host(host);
        }

        if let Some(port) = url.port() {
            params = params.port(port);
        }

        let user = url.username();
        if !user.is_empty() {
            params = params.user(&decode(user)?);
        }

        if let Some(passwd) = url.password() {
            params = params.passwd(&decode(passwd)?);
        }

        let path = url.path().trim_start_matches('/');
        if !path.is_empty() {
            params = params.db(&decode(path)?);
        }

        for (key, value) in url.query_pairs() {
            if &*key == "socket" {
                params = params.socket(&*value);
            }
        }

        Ok(params)
    }
}

fn decode(component: &str) -> Result<String, Error> {
    percent_decode_str(component)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|err| Error::Configuration(err.to_string()))
}

impl FromStr for ConnectParams {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let url: Url = s
            .parse()
            .map_err(|err: url::ParseError| Error::Configuration(err.to_string()))?;

        Self::parse_from_url(&url)
    }
}

#[test]
fn it_parses_username_with_at_sign_correctly() {
    let url = "mysql://user@hostname:password@hostname:5432/database";
    let params = ConnectParams::from_str(url).unwrap();

    assert_eq!("user@hostname", &params.user);
}

#[test]
fn it_parses_password_with_non_ascii_chars_correctly() {
    let url = "mysql://username:p@ssw0rd@hostname:5432/database";
    let params = ConnectParams::from_str(url).unwrap();

    assert_eq!("p@ssw0rd", &params.passwd);
}

#[test]
fn it_parses_socket_correctly() {
    let url = "mysql://root@localhost/test?socket=%2Fvar%2Frun%2Fmysqld%2Fmysqld.sock";
    let params = ConnectParams::from_str(url).unwrap();

    assert_eq!(
        Some(std::path::Path::new("/var/run/mysqld/mysqld.sock")),
        params.get_socket()
    );
    assert_eq!("test", params.get_db());
}

#[test]
fn it_keeps_defaults_for_missing_components() {
    let params = ConnectParams::from_str("mysql://localhost").unwrap();

    assert_eq!("root", params.get_user());
    assert_eq!(3306, params.get_port());
    assert_eq!("test", params.get_db());
}

#[test]
fn it_rejects_other_schemes() {
    let err = ConnectParams::from_str("postgres://localhost/test").unwrap_err();

    assert!(matches!(err, Error::Configuration(_)));
}
