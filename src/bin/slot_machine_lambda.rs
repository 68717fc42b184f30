use aws_sdk_samples::dynamodb::DynamoDb;
use aws_sdk_samples::logging;
use aws_sdk_samples::slot_machine::{self, DynamoDbWheel, Spin, WHEEL_TABLE};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing::Level;

async fn handle_request(
    wheel: &DynamoDbWheel,
    _event: LambdaEvent<serde_json::Value>,
) -> Result<Spin, Error> {
    Ok(slot_machine::spin(wheel).await?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init_logging(Level::INFO)?;

    let table = std::env::var("SLOT_WHEEL_TABLE").unwrap_or_else(|_| WHEEL_TABLE.to_string());
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let wheel = DynamoDbWheel::new(DynamoDb::new(&aws_config), table);

    let wheel = &wheel;
    lambda_runtime::run(service_fn(move |event| async move {
        handle_request(wheel, event).await
    }))
    .await
}
