use aws_smithy_types::error::metadata::ProvideErrorMetadata;
use tracing::error;

/// Logs the code and message the service attached to a failed call and
/// wraps the error with the name of the operation that produced it.
///
/// Works for any `SdkError<E, _>` whose `E` is a generated operation error.
pub fn service_error<E>(operation: &str, err: E) -> anyhow::Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let code = err.code().unwrap_or("Unknown").to_string();
    let message = err.message().unwrap_or("no message").to_string();
    error!(operation, code = %code, "{message}");
    anyhow::Error::new(err).context(format!("{operation} failed ({code}): {message}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_smithy_types::error::ErrorMetadata;

    #[derive(Debug)]
    struct FakeError(ErrorMetadata);

    impl std::fmt::Display for FakeError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "fake service error")
        }
    }

    impl std::error::Error for FakeError {}

    impl ProvideErrorMetadata for FakeError {
        fn meta(&self) -> &ErrorMetadata {
            &self.0
        }
    }

    #[test]
    fn context_names_operation_and_code() {
        let err = FakeError(
            ErrorMetadata::builder()
                .code("NoSuchBucket")
                .message("The specified bucket does not exist")
                .build(),
        );
        let wrapped = service_error("GetObject", err);
        assert_eq!(
            wrapped.to_string(),
            "GetObject failed (NoSuchBucket): The specified bucket does not exist"
        );
        assert!(wrapped.downcast_ref::<FakeError>().is_some());
    }

    #[test]
    fn missing_metadata_falls_back() {
        let wrapped = service_error("ListQueues", FakeError(ErrorMetadata::builder().build()));
        assert_eq!(wrapped.to_string(), "ListQueues failed (Unknown): no message");
    }
}
