//! Slot machine backed by a DynamoDB table of wheel images.
//!
//! Each of the 16 wheel positions maps to an image file. A spin draws three
//! positions, looks the three images up concurrently and wins when they all
//! match.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use futures::future::try_join_all;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dynamodb::{DynamoDb, FieldType, Item, Table};

pub const WHEEL_TABLE: &str = "slotWheels";
pub const POSITION_KEY: &str = "slotPosition";
pub const IMAGE_ATTRIBUTE: &str = "imageFile";
pub const WHEEL_SIZE: u32 = 16;

const SYMBOLS: [&str; 8] = [
    "cherry.png",
    "lemon.png",
    "orange.png",
    "plum.png",
    "bell.png",
    "bar.png",
    "seven.png",
    "melon.png",
];

/// Where wheel images are looked up.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WheelStore: Send + Sync {
    async fn image_at(&self, position: u32) -> Result<String>;
}

/// Outcome of one pull of the lever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spin {
    pub is_winner: bool,
    pub left_wheel_image: String,
    pub middle_wheel_image: String,
    pub right_wheel_image: String,
}

impl Spin {
    fn from_images(left: String, middle: String, right: String) -> Self {
        Self {
            is_winner: left == middle && middle == right,
            left_wheel_image: left,
            middle_wheel_image: middle,
            right_wheel_image: right,
        }
    }
}

/// Draws one position per wheel, each in `0..WHEEL_SIZE`.
pub fn draw_positions(rng: &mut impl Rng) -> [u32; 3] {
    [
        rng.random_range(0..WHEEL_SIZE),
        rng.random_range(0..WHEEL_SIZE),
        rng.random_range(0..WHEEL_SIZE),
    ]
}

/// Image shown at a wheel position; the symbol strip repeats twice per wheel.
pub fn image_for_position(position: u32) -> &'static str {
    SYMBOLS[position as usize % SYMBOLS.len()]
}

/// Spins the three wheels with the thread-local RNG.
pub async fn spin(store: &impl WheelStore) -> Result<Spin> {
    let positions = draw_positions(&mut rand::rng());
    spin_at(store, positions).await
}

/// Looks up the images at the given positions concurrently.
pub async fn spin_at(store: &impl WheelStore, positions: [u32; 3]) -> Result<Spin> {
    let images = try_join_all(positions.iter().map(|&p| store.image_at(p))).await?;
    let [left, middle, right]: [String; 3] = images
        .try_into()
        .map_err(|_| anyhow!("expected three wheel images"))?;
    let spin = Spin::from_images(left, middle, right);
    info!(?positions, is_winner = spin.is_winner, "Spun the wheels");
    Ok(spin)
}

/// Wheel images stored in DynamoDB, one item per position.
#[derive(Debug, Clone)]
pub struct DynamoDbWheel {
    ddb: DynamoDb,
    table_name: String,
}

impl DynamoDbWheel {
    pub fn new(ddb: DynamoDb, table_name: impl Into<String>) -> Self {
        Self {
            ddb,
            table_name: table_name.into(),
        }
    }

    /// Creates the wheel table if needed and writes every position.
    pub async fn seed(&self) -> Result<usize> {
        let table = Table::new(&self.table_name, POSITION_KEY, None)
            .with_key_types(FieldType::Number, FieldType::String);
        if self.ddb.create_table_if_not_exists(&table).await?.is_some() {
            self.ddb.wait_for_table_active(&self.table_name).await?;
        }

        let items = (0..WHEEL_SIZE)
            .map(|position| {
                Item::new()
                    .set_number(POSITION_KEY, position)
                    .set_string(IMAGE_ATTRIBUTE, image_for_position(position))
            })
            .collect();
        self.ddb.batch_put(&self.table_name, items).await
    }
}

#[async_trait]
impl WheelStore for DynamoDbWheel {
    async fn image_at(&self, position: u32) -> Result<String> {
        let key = Item::new().set(POSITION_KEY, AttributeValue::N(position.to_string()));
        let item = self
            .ddb
            .get_item(&self.table_name, key)
            .await?
            .ok_or_else(|| anyhow!("no wheel image at position {position}"))?;
        item.get_string(IMAGE_ATTRIBUTE)
            .cloned()
            .ok_or_else(|| anyhow!("position {position} has no {IMAGE_ATTRIBUTE}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn positions_stay_on_the_wheel() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            assert!(draw_positions(&mut rng).iter().all(|&p| p < WHEEL_SIZE));
        }
    }

    #[test]
    fn every_position_has_an_image() {
        assert_eq!(image_for_position(0), "cherry.png");
        assert_eq!(image_for_position(8), "cherry.png");
        assert_eq!(image_for_position(15), "melon.png");
    }

    #[tokio::test]
    async fn matching_images_win() {
        let mut store = MockWheelStore::new();
        store
            .expect_image_at()
            .times(3)
            .returning(|p| Ok(image_for_position(p).to_string()));

        let spin = spin_at(&store, [6, 14, 6]).await.unwrap();
        assert!(spin.is_winner);
        assert_eq!(spin.left_wheel_image, "seven.png");
    }

    #[tokio::test]
    async fn mixed_images_lose() {
        let mut store = MockWheelStore::new();
        store
            .expect_image_at()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok("lemon.png".to_string()));
        store
            .expect_image_at()
            .with(eq(2))
            .times(2)
            .returning(|_| Ok("orange.png".to_string()));

        let spin = spin_at(&store, [1, 2, 2]).await.unwrap();
        assert!(!spin.is_winner);
        assert_eq!(spin.middle_wheel_image, "orange.png");
        assert_eq!(spin.right_wheel_image, "orange.png");
    }

    #[tokio::test]
    async fn lookup_failure_fails_the_spin() {
        let mut store = MockWheelStore::new();
        store
            .expect_image_at()
            .returning(|p| Err(anyhow!("no wheel image at position {p}")));

        assert!(spin(&store).await.is_err());
    }

    #[test]
    fn spin_serializes_for_the_browser() {
        let spin = Spin::from_images("a.png".into(), "a.png".into(), "b.png".into());
        let json = serde_json::to_value(&spin).unwrap();
        assert_eq!(json["isWinner"], false);
        assert_eq!(json["rightWheelImage"], "b.png");
    }
}
