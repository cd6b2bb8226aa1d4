#![allow(dead_code)]

use std::io::Cursor;

use chrono::{DateTime, TimeZone, Utc};
use image::{ImageBuffer, ImageFormat, Rgb};
use sea_orm::{Database, DatabaseConnection};

use engine::{Account, Engine, RegisterCmd, TagCmd, WalletCmd};
use migration::MigratorTrait;

pub struct TestEngine {
    pub engine: Engine,
    pub db: DatabaseConnection,
    pub media: tempfile::TempDir,
}

pub async fn engine() -> TestEngine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let media = tempfile::tempdir().unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .media_root(media.path())
        .build()
        .await
        .unwrap();
    TestEngine { engine, db, media }
}

pub async fn account(engine: &Engine, email: &str) -> Account {
    engine
        .register(RegisterCmd::new(email, "testpass123"))
        .await
        .unwrap()
}

pub async fn wallet(engine: &Engine, user_id: i32, name: &str) -> i32 {
    engine
        .create_wallet(user_id, WalletCmd::new(name, "USD").balance(100))
        .await
        .unwrap()
        .id
}

pub async fn tag(engine: &Engine, user_id: i32, name: &str) -> i32 {
    engine
        .create_tag(user_id, TagCmd::new(name))
        .await
        .unwrap()
        .id
}

pub fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 9, day, 14, 7, 9).unwrap()
}

pub fn png_bytes() -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(8, 8, Rgb([200, 30, 30]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}
