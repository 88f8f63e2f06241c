use crate::InvalidMethodId;
use http::uri::PathAndQuery;
use std::fmt;

/// Identifies the remote procedure a request targets, as the gRPC path
/// `/<package.Service>/<Method>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodId(PathAndQuery);

impl MethodId {
    /// Build a [`MethodId`] from a fully qualified service name and a method name.
    ///
    /// ```
    /// let method = relaycall::MethodId::new("helloworld.Greeter", "SayHello").unwrap();
    /// assert_eq!(method.path(), "/helloworld.Greeter/SayHello");
    /// ```
    pub fn new(service: &str, method: &str) -> Result<Self, InvalidMethodId> {
        let input = || format!("{}/{}", service, method);

        for (what, part) in [("service", service), ("method", method)] {
            if part.is_empty() {
                return Err(InvalidMethodId::new(input(), format!("empty {} name", what)));
            }
            if let Some(c) = part
                .chars()
                .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_')))
            {
                return Err(InvalidMethodId::new(
                    input(),
                    format!("invalid character {:?} in {} name", c, what),
                ));
            }
        }

        PathAndQuery::try_from(format!("/{}/{}", service, method))
            .map(Self)
            .map_err(|err| InvalidMethodId::new(input(), err.to_string()))
    }

    /// Build a [`MethodId`] from a static path such as `/helloworld.Greeter/SayHello`.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid uri path.
    pub fn from_static(path: &'static str) -> Self {
        Self(PathAndQuery::from_static(path))
    }

    /// The gRPC path, e.g. `/helloworld.Greeter/SayHello`.
    pub fn path(&self) -> &str {
        self.0.path()
    }

    pub(crate) fn path_and_query(&self) -> &PathAndQuery {
        &self.0
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
