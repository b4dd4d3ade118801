use crate::Result;

use geostore_core::{
    async_trait,
    driver::{Capability, Connection, Driver},
    Error,
};
use url::Url;

/// A driver chosen by the scheme of a connection URL.
#[derive(Debug)]
pub struct Connect {
    driver: Box<dyn Driver>,
}

impl Connect {
    /// `fetch_size` bounds the rows a driver buffers ahead of the consumer.
    pub fn new(url: &str, fetch_size: usize) -> Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|err| Error::invalid_config(format!("connection url `{url}`: {err}")))?;

        let driver = match parsed.scheme() {
            "postgres" | "postgresql" => postgresql(url, fetch_size)?,
            "sqlite" => sqlite(url, fetch_size)?,
            scheme => {
                return Err(Error::invalid_config(format!(
                    "unsupported backend; scheme={scheme}; url={url}"
                )))
            }
        };

        Ok(Self { driver })
    }
}

#[async_trait]
impl Driver for Connect {
    async fn connect(&self) -> Result<Box<dyn Connection>> {
        self.driver.connect().await
    }

    fn capability(&self) -> &'static Capability {
        self.driver.capability()
    }

    fn max_connections(&self) -> Option<usize> {
        self.driver.max_connections()
    }
}

#[cfg(feature = "postgresql")]
fn postgresql(url: &str, fetch_size: usize) -> Result<Box<dyn Driver>> {
    let driver = geostore_driver_postgresql::PostgreSQL::new(url)?.fetch_size(fetch_size);
    Ok(Box::new(driver))
}

#[cfg(not(feature = "postgresql"))]
fn postgresql(_url: &str, _fetch_size: usize) -> Result<Box<dyn Driver>> {
    Err(Error::invalid_config("`postgresql` feature not enabled"))
}

#[cfg(feature = "sqlite")]
fn sqlite(url: &str, fetch_size: usize) -> Result<Box<dyn Driver>> {
    let driver = geostore_driver_sqlite::Sqlite::new(url)?.fetch_size(fetch_size);
    Ok(Box::new(driver))
}

#[cfg(not(feature = "sqlite"))]
fn sqlite(_url: &str, _fetch_size: usize) -> Result<Box<dyn Driver>> {
    Err(Error::invalid_config("`sqlite` feature not enabled"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_schemes() {
        let err = Connect::new("mongodb://localhost/features", 16).unwrap_err();
        assert!(err.is_invalid_config());

        let err = Connect::new("not a url", 16).unwrap_err();
        assert!(err.is_invalid_config());
    }
}
