use secrecy::SecretString;

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub token_secret: SecretString,
    pub totp_issuer: String,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(token_secret: SecretString, totp_issuer: String) -> Self {
        Self {
            token_secret,
            totp_issuer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(
            SecretString::from("swordfish".to_string()),
            "Bucketlist".to_string(),
        );
        assert_eq!(args.token_secret.expose_secret(), "swordfish");
        assert_eq!(args.totp_issuer, "Bucketlist");
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let args = GlobalArgs::new(
            SecretString::from("swordfish".to_string()),
            "Bucketlist".to_string(),
        );
        let debugged = format!("{args:?}");
        assert!(!debugged.contains("swordfish"));
    }
}
