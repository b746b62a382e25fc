use secrecy::{ExposeSecret, Secret};
use unicode_segmentation::UnicodeSegmentation;

pub const MIN_PASSWORD_LENGTH: usize = 7;

/// A password the user wants to switch to.
///
/// Mirrors the `minlength` constraint of the form's input control so that
/// clients skipping browser validation get the same answer.
pub struct NewPassword(Secret<String>);

impl NewPassword {
    pub fn parse(new_password: Secret<String>) -> Result<Self, String> {
        let pass_length = new_password.expose_secret().graphemes(true).count();

        if pass_length < MIN_PASSWORD_LENGTH {
            return Err(format!(
                "The new password must be at least {} characters long.",
                MIN_PASSWORD_LENGTH,
            ));
        }

        Ok(Self(new_password))
    }
}

impl ExposeSecret<String> for NewPassword {
    fn expose_secret(&self) -> &String {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for NewPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NewPassword([REDACTED])")
    }
}
