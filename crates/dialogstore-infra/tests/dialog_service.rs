//! End-to-end dialog service scenarios against every storage driver.

use std::path::Path;
use std::sync::Arc;

use dialogstore_core::service::dialog::DialogService;
use dialogstore_infra::store::DialogStore;
use dialogstore_types::config::{DatabaseConfig, Driver};
use dialogstore_types::dialog::CreateDialogRequest;
use dialogstore_types::error::DialogError;

async fn open_store(driver: Driver) -> DialogStore {
    let dir = tempfile::tempdir().unwrap();
    let data_source = format!("sqlite://{}?mode=rwc", dir.path().join("it.db").display());
    // Leak tempdir so it lives for the test
    std::mem::forget(dir);

    let config = DatabaseConfig {
        driver,
        data_source,
        migrations_path: Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations"),
    };
    DialogStore::open(&config).await.unwrap()
}

fn request(id: i64, chat_id: i64) -> CreateDialogRequest {
    CreateDialogRequest {
        id,
        user_name: "test".to_string(),
        first_name: "test1".to_string(),
        last_name: "test2".to_string(),
        chat_id,
    }
}

const DRIVERS: [Driver; 2] = [Driver::Sqlite, Driver::Memory];

#[tokio::test]
async fn full_lifecycle() {
    for driver in DRIVERS {
        let service = DialogService::new(open_store(driver).await);

        assert_eq!(service.create(request(1, 1)).await.unwrap(), 1);

        let dialog = service.get(1).await.unwrap();
        assert!(!dialog.is_replied());
        assert_eq!(dialog.reply(), "");

        service.set_reply(1, "hi").await.unwrap();
        let dialog = service.get(1).await.unwrap();
        assert_eq!(dialog.reply(), "hi");
        assert!(dialog.is_replied());

        service.delete(1).await.unwrap();
        let err = service.get(1).await.unwrap_err();
        assert!(matches!(err, DialogError::NotFound(1)), "{driver}");

        service.end_session().await;
    }
}

#[tokio::test]
async fn duplicate_create_keeps_first_payload() {
    for driver in DRIVERS {
        let service = DialogService::new(open_store(driver).await);

        service.create(request(5, 10)).await.unwrap();
        let mut second = request(5, 10);
        second.user_name = "intruder".to_string();
        let err = service.create(second).await.unwrap_err();
        assert!(matches!(err, DialogError::AlreadyExists(5)), "{driver}");

        let dialog = service.get(5).await.unwrap();
        assert_eq!(dialog.user_name(), "test");
        assert_eq!(dialog.chat_id(), 10);
    }
}

#[tokio::test]
async fn invalid_ids_are_rejected() {
    for driver in DRIVERS {
        let service = DialogService::new(open_store(driver).await);

        let err = service.create(request(0, 0)).await.unwrap_err();
        assert!(matches!(err, DialogError::InvalidId { id: 0, chat_id: 0 }));

        let err = service.get(0).await.unwrap_err();
        assert!(matches!(err, DialogError::NotFound(0)), "{driver}");
    }
}

#[tokio::test]
async fn reply_rules() {
    for driver in DRIVERS {
        let service = DialogService::new(open_store(driver).await);
        service.create(request(1, 1)).await.unwrap();

        let err = service.set_reply(1, "").await.unwrap_err();
        assert!(matches!(err, DialogError::EmptyMessage));
        assert!(!service.get(1).await.unwrap().is_replied());

        let replied = service.set_reply(1, "x").await.unwrap();
        assert_eq!(replied.reply(), "x");

        let err = service.set_reply(1, "y").await.unwrap_err();
        assert!(matches!(err, DialogError::AlreadyReplied(1)), "{driver}");
        assert_eq!(service.get(1).await.unwrap().reply(), "x");

        let err = service.set_reply(404, "y").await.unwrap_err();
        assert!(matches!(err, DialogError::NotFound(404)));
    }
}

#[tokio::test]
async fn concurrent_replies_have_one_winner() {
    for driver in DRIVERS {
        let service = Arc::new(DialogService::new(open_store(driver).await));
        service.create(request(3, 3)).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..10 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service.set_reply(3, &format!("reply {i}")).await
            }));
        }

        let mut winners = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                Ok(dialog) => winners.push(dialog.reply().to_string()),
                Err(DialogError::AlreadyReplied(3)) => {}
                Err(other) => panic!("unexpected error on {driver}: {other}"),
            }
        }

        assert_eq!(winners.len(), 1, "{driver}");
        assert_eq!(service.get(3).await.unwrap().reply(), winners[0]);
    }
}
