use secrecy::{ExposeSecret, Secret};

/// Opaque credential issued by the identity provider for the signed-in user.
#[derive(Clone)]
pub struct SessionToken(Secret<String>);

impl SessionToken {
    pub fn parse(token: String) -> Result<Self, String> {
        if token.is_empty() {
            return Err("The session token is empty.".into());
        }

        if token.chars().any(char::is_whitespace) {
            return Err("The session token contains whitespace.".into());
        }

        Ok(Self(Secret::new(token)))
    }
}

impl ExposeSecret<String> for SessionToken {
    fn expose_secret(&self) -> &String {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}
