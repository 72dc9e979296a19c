//! Repository behaviour against a real SQLite file

use std::task::Poll;
use std::time::Duration;

use chrono::{Timelike, Utc};
use futures::TryStreamExt;
use sqlx::SqlitePool;
use tempfile::TempDir;

use findq_core::db::{NewPing, PingImageRepo, PingRepo, QrCodeRepo, UserRepo};
use findq_core::models::{Coordinates, Description, Username};
use findq_core::{create_pool, create_schema, Attachment, AttachmentStore, DbError, UnitOfWork};

struct Fixture {
    dir: TempDir,
    pool: SqlitePool,
    store: AttachmentStore,
}

impl Fixture {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("findq.sqlite").display());
        let pool = create_pool(&url).await.unwrap();
        create_schema(&pool).await.unwrap();
        let store = AttachmentStore::new(dir.path().join("qr_ping_images"));
        Self { dir, pool, store }
    }

    fn uow(&self) -> UnitOfWork {
        UnitOfWork::new(self.pool.clone())
    }

    async fn user(&self, name: &str) -> i64 {
        let mut uow = self.uow();
        UserRepo::new(&mut uow)
            .create(&Username::new(name).unwrap())
            .await
            .unwrap()
    }

    async fn code(&self, user_id: i64, description: &str) -> i64 {
        let mut uow = self.uow();
        QrCodeRepo::new(&mut uow)
            .create(user_id, &Description::new(description).unwrap())
            .await
            .unwrap()
    }

    async fn ping(&self, qr_code_id: i64, description: &str, attachments: &[Attachment]) -> i64 {
        let mut uow = self.uow();
        PingRepo::new(&mut uow)
            .create(
                NewPing {
                    qr_code_id,
                    coordinates: Coordinates::new(40.0, -73.0).unwrap(),
                    description,
                },
                attachments,
                &self.store,
            )
            .await
            .unwrap()
    }

    async fn count(&self, sql: &str, id: i64) -> i64 {
        sqlx::query_scalar(sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

fn photo(name: &str) -> Attachment {
    Attachment::new(name, name.as_bytes().to_vec()).unwrap()
}

#[tokio::test]
async fn load_by_id_returns_requested_row() {
    let fx = Fixture::new().await;
    let user_id = fx.user("francis").await;
    let code_id = fx.code(user_id, "Front Door").await;
    let ping_id = fx.ping(code_id, "", &[photo("a.jpg")]).await;

    let mut uow = fx.uow();
    assert_eq!(UserRepo::new(&mut uow).get(user_id).await.unwrap().id, user_id);
    assert_eq!(QrCodeRepo::new(&mut uow).get(code_id).await.unwrap().id, code_id);
    assert_eq!(PingRepo::new(&mut uow).get(ping_id).await.unwrap().id, ping_id);

    let images: Vec<_> = PingRepo::new(&mut uow).images(ping_id).try_collect().await.unwrap();
    let image = PingImageRepo::new(&mut uow).get(images[0].id).await.unwrap();
    assert_eq!(image.qr_code_ping_id, ping_id);
}

#[tokio::test]
async fn missing_ids_are_not_found() {
    let fx = Fixture::new().await;
    let mut uow = fx.uow();

    let err = UserRepo::new(&mut uow).get(404).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound { resource: "user", .. }));

    let err = QrCodeRepo::new(&mut uow).get(404).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound { resource: "qr code", .. }));

    let err = PingRepo::new(&mut uow).get(404).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound { resource: "ping", .. }));

    let err = PingImageRepo::new(&mut uow).get(404).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound { resource: "ping image", .. }));
}

#[tokio::test]
async fn created_code_round_trips() {
    let fx = Fixture::new().await;
    let user_id = fx.user("francis").await;
    let before = Utc::now().naive_utc().with_nanosecond(0).unwrap();

    let code_id = fx.code(user_id, "  Front Door ").await;

    let mut uow = fx.uow();
    let code = QrCodeRepo::new(&mut uow).get(code_id).await.unwrap();
    assert_eq!(code.user_id, user_id);
    assert_eq!(code.description, "Front Door");
    assert!(code.created_at >= before);

    let owner = QrCodeRepo::new(&mut uow).owner(&code).await.unwrap();
    assert_eq!(owner.username, "francis");
}

#[tokio::test]
async fn code_for_unknown_user_violates_constraint() {
    let fx = Fixture::new().await;
    let mut uow = fx.uow();

    let err = QrCodeRepo::new(&mut uow)
        .create(99, &Description::new("Orphan").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Constraint(_)), "got {err:?}");
}

#[tokio::test]
async fn duplicate_username_violates_constraint() {
    let fx = Fixture::new().await;
    fx.user("francis").await;

    let mut uow = fx.uow();
    let err = UserRepo::new(&mut uow)
        .create(&Username::new("francis").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Constraint(_)));
}

#[tokio::test]
async fn ping_with_attachments_stores_rows_and_files() {
    let fx = Fixture::new().await;
    let user_id = fx.user("francis").await;
    let code_id = fx.code(user_id, "Front Door").await;

    let pings_before = fx.count("SELECT COUNT(*) FROM qr_code_ping WHERE qr_code_id = ?", code_id).await;
    let ping_id = fx
        .ping(code_id, "left package", &[photo("porch.JPG"), photo("box.png")])
        .await;

    assert_eq!(
        fx.count("SELECT COUNT(*) FROM qr_code_ping WHERE qr_code_id = ?", code_id).await,
        pings_before + 1
    );
    assert_eq!(
        fx.count("SELECT COUNT(*) FROM qr_code_ping_image WHERE qr_code_ping_id = ?", ping_id).await,
        2
    );

    let mut uow = fx.uow();
    let ping = PingRepo::new(&mut uow).get(ping_id).await.unwrap();
    assert_eq!(ping.lat, 40.0);
    assert_eq!(ping.lon, -73.0);
    assert_eq!(ping.description, "left package");

    let images: Vec<_> = PingRepo::new(&mut uow).images(ping_id).try_collect().await.unwrap();
    assert_eq!(images.len(), 2);
    assert!(images.iter().all(|i| i.qr_code_ping_id == ping_id));

    let first = fx.store.dir().join(format!("{}.JPG", images[0].id));
    let second = fx.store.dir().join(format!("{}.png", images[1].id));
    assert_eq!(std::fs::read(first).unwrap(), b"porch.JPG");
    assert_eq!(std::fs::read(second).unwrap(), b"box.png");

    let code = PingRepo::new(&mut uow).qr_code(&ping).await.unwrap();
    assert_eq!(code.id, code_id);
}

#[tokio::test]
async fn failed_attachment_write_rolls_back_ping() {
    let fx = Fixture::new().await;
    let user_id = fx.user("francis").await;
    let code_id = fx.code(user_id, "Front Door").await;

    // a regular file where the image directory should be
    let blocked = fx.dir.path().join("blocked");
    std::fs::write(&blocked, b"").unwrap();
    let store = AttachmentStore::new(&blocked);

    let mut uow = fx.uow();
    let err = PingRepo::new(&mut uow)
        .create(
            NewPing {
                qr_code_id: code_id,
                coordinates: Coordinates::new(1.0, 2.0).unwrap(),
                description: "",
            },
            &[photo("a.jpg")],
            &store,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Attachment { .. }));
    drop(uow);

    assert_eq!(
        fx.count("SELECT COUNT(*) FROM qr_code_ping WHERE qr_code_id = ?", code_id).await,
        0
    );
    assert_eq!(
        fx.count("SELECT COUNT(*) FROM qr_code_ping_image WHERE id > ?", 0).await,
        0
    );
}

#[tokio::test]
async fn dropped_creation_leaves_no_files() {
    let fx = Fixture::new().await;
    let user_id = fx.user("francis").await;
    let code_id = fx.code(user_id, "Front Door").await;
    let photos = [photo("first.jpg"), photo("second.jpg")];
    let first_file = fx.store.dir().join("1.jpg");

    let mut uow = fx.uow();
    let mut repo = PingRepo::new(&mut uow);
    let mut creation = Box::pin(repo.create(
        NewPing {
            qr_code_id: code_id,
            coordinates: Coordinates::new(1.0, 2.0).unwrap(),
            description: "abandoned",
        },
        &photos,
        &fx.store,
    ));

    // drive the creation until the first photo reaches the disk, then abandon it
    let mut observed = false;
    for _ in 0..5_000 {
        if let Poll::Ready(result) = futures::poll!(creation.as_mut()) {
            panic!("creation finished before a photo was observed: {:?}", result);
        }
        if first_file.exists() {
            observed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    assert!(observed, "first photo never appeared");
    drop(creation);
    drop(repo);
    drop(uow);

    assert!(!first_file.exists());
    assert_eq!(
        fx.count("SELECT COUNT(*) FROM qr_code_ping_image WHERE id > ?", 0).await,
        0
    );

    // the rolled-back ids are handed out again; the new row must see its own file
    let ping_id = fx.ping(code_id, "", &[photo("real.png")]).await;
    let mut uow = fx.uow();
    let images: Vec<_> = PingRepo::new(&mut uow).images(ping_id).try_collect().await.unwrap();
    assert_eq!(images.len(), 1);
    let located = fx.store.locate(images[0].id).await.unwrap().unwrap();
    assert_eq!(std::fs::read(located).unwrap(), b"real.png");
}

#[tokio::test]
async fn standalone_image_row() {
    let fx = Fixture::new().await;
    let user_id = fx.user("francis").await;
    let code_id = fx.code(user_id, "Gate").await;
    let ping_id = fx.ping(code_id, "", &[]).await;

    let mut uow = fx.uow();
    let image_id = PingImageRepo::new(&mut uow).create(ping_id).await.unwrap();
    let image = PingImageRepo::new(&mut uow).get(image_id).await.unwrap();
    assert_eq!(image.qr_code_ping_id, ping_id);

    let err = PingImageRepo::new(&mut uow).create(12345).await.unwrap_err();
    assert!(matches!(err, DbError::Constraint(_)));
}

#[tokio::test]
async fn user_pings_are_concatenated_per_code() {
    let fx = Fixture::new().await;
    let user_id = fx.user("francis").await;
    let other = fx.user("someone-else").await;
    let door = fx.code(user_id, "Front Door").await;
    let bike = fx.code(user_id, "Bike").await;
    let foreign = fx.code(other, "Not mine").await;

    // interleave creation so insertion order differs from per-code order
    let b1 = fx.ping(bike, "b1", &[]).await;
    let d1 = fx.ping(door, "d1", &[]).await;
    let b2 = fx.ping(bike, "b2", &[]).await;
    let d2 = fx.ping(door, "d2", &[]).await;
    fx.ping(foreign, "x", &[]).await;

    let mut uow = fx.uow();
    let ids: Vec<i64> = UserRepo::new(&mut uow)
        .qr_code_pings(user_id)
        .map_ok(|p| p.id)
        .try_collect()
        .await
        .unwrap();

    assert_eq!(ids, vec![d1, d2, b1, b2]);

    let per_code = fx.count("SELECT COUNT(*) FROM qr_code_ping WHERE qr_code_id = ?", door).await
        + fx.count("SELECT COUNT(*) FROM qr_code_ping WHERE qr_code_id = ?", bike).await;
    assert_eq!(ids.len() as i64, per_code);
}

#[tokio::test]
async fn navigation_restarts_on_each_call() {
    let fx = Fixture::new().await;
    let user_id = fx.user("francis").await;
    let a = fx.code(user_id, "A").await;
    let b = fx.code(user_id, "B").await;

    let mut uow = fx.uow();
    for _ in 0..2 {
        let ids: Vec<i64> = UserRepo::new(&mut uow)
            .qr_codes(user_id)
            .map_ok(|c| c.id)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(ids, vec![a, b]);
    }
}

#[tokio::test]
async fn streams_span_several_pages() {
    let fx = Fixture::new().await;
    let user_id = fx.user("francis").await;
    let code_id = fx.code(user_id, "Busy door").await;

    let mut expected = Vec::new();
    for i in 0..120 {
        expected.push(fx.ping(code_id, &format!("ping {i}"), &[]).await);
    }

    let mut uow = fx.uow();
    let ids: Vec<i64> = QrCodeRepo::new(&mut uow)
        .pings(code_id)
        .map_ok(|p| p.id)
        .try_collect()
        .await
        .unwrap();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn latest_ping_for_user() {
    let fx = Fixture::new().await;
    let user_id = fx.user("francis").await;
    let door = fx.code(user_id, "Front Door").await;

    let mut uow = fx.uow();
    assert!(PingRepo::new(&mut uow).latest_for_user(user_id).await.unwrap().is_none());
    drop(uow);

    fx.ping(door, "first", &[]).await;
    let second = fx.ping(door, "second", &[]).await;

    let mut uow = fx.uow();
    let latest = PingRepo::new(&mut uow).latest_for_user(user_id).await.unwrap().unwrap();
    assert_eq!(latest.id, second);
}

#[tokio::test]
async fn front_door_walkthrough() {
    let fx = Fixture::new().await;
    let user_id = fx.user("owner").await;
    let code_id = fx.code(user_id, "Front Door").await;

    let mut uow = fx.uow();
    let code = QrCodeRepo::new(&mut uow).get(code_id).await.unwrap();
    assert_eq!(code.description, "Front Door");
    assert_eq!(code.user_id, user_id);
    drop(uow);

    let images_before = fx.count("SELECT COUNT(*) FROM qr_code_ping_image WHERE id > ?", 0).await;
    let pings_before = fx.count("SELECT COUNT(*) FROM qr_code_ping WHERE qr_code_id = ?", code_id).await;

    fx.ping(code_id, "left package", &[photo("1.jpg"), photo("2.jpg")]).await;

    assert_eq!(
        fx.count("SELECT COUNT(*) FROM qr_code_ping WHERE qr_code_id = ?", code_id).await,
        pings_before + 1
    );
    assert_eq!(
        fx.count("SELECT COUNT(*) FROM qr_code_ping_image WHERE id > ?", 0).await,
        images_before + 2
    );
}
