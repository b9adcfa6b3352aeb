//! Menu reordering against a mocked backend: only changed siblings are
//! written, and a failed write reloads the canonical list.

mod common;

use formflow_console::api::ApiError;
use formflow_console::models::menu::{self, MenuItem};
use mockito::Matcher;
use serde_json::json;
use common::{client_for, menu_item};

fn root_menu() -> Vec<MenuItem> {
    vec![
        menu_item(1, None, 1),
        menu_item(2, None, 2),
        menu_item(3, None, 3),
        menu_item(4, Some(1), 1),
    ]
}

fn orders(items: &[MenuItem]) -> Vec<(i64, i32)> {
    items.iter().map(|i| (i.id, i.order)).collect()
}

#[tokio::test]
async fn test_reorder_writes_only_changed_siblings() {
    let mut server = mockito::Server::new_async().await;
    let untouched = server
        .mock("PUT", "/Menus/1")
        .expect(0)
        .create_async()
        .await;
    let moved_up = server
        .mock("PUT", "/Menus/3")
        .match_body(Matcher::PartialJson(json!({ "id": 3, "order": 2 })))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let moved_down = server
        .mock("PUT", "/Menus/2")
        .match_body(Matcher::PartialJson(json!({ "id": 2, "order": 3 })))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let api = client_for(&server);
    let mut items = root_menu();
    menu::reorder(&api, &mut items, None, &[1, 3, 2])
        .await
        .expect("Reorder should succeed");

    assert_eq!(orders(&items), vec![(1, 1), (2, 3), (3, 2), (4, 1)]);
    untouched.assert_async().await;
    moved_up.assert_async().await;
    moved_down.assert_async().await;
}

#[tokio::test]
async fn test_failed_write_reloads_from_backend() {
    let mut server = mockito::Server::new_async().await;
    let failing = server
        .mock("PUT", "/Menus/3")
        .with_status(500)
        .with_body(r#"{"title":"Falha ao salvar o menu"}"#)
        .expect(1)
        .create_async()
        .await;
    let skipped = server
        .mock("PUT", "/Menus/2")
        .expect(0)
        .create_async()
        .await;
    let reload = server
        .mock("GET", "/Menus")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({ "itens": [
                { "id": 1, "name": "Início", "order": 1 },
                { "id": 2, "name": "Relatórios", "order": 2 }
            ] })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let api = client_for(&server);
    let mut items = root_menu();
    let err = menu::reorder(&api, &mut items, None, &[1, 3, 2])
        .await
        .expect_err("Reorder should fail");

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.message(), "Falha ao salvar o menu");
    assert_eq!(orders(&items), vec![(1, 1), (2, 2)]);
    failing.assert_async().await;
    skipped.assert_async().await;
    reload.assert_async().await;
}

#[tokio::test]
async fn test_failed_reload_restores_previous_order() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("PUT", "/Menus/3")
        .with_status(409)
        .create_async()
        .await;
    server
        .mock("GET", "/Menus")
        .with_status(503)
        .create_async()
        .await;

    let api = client_for(&server);
    let mut items = root_menu();
    let err = menu::reorder(&api, &mut items, None, &[1, 3, 2])
        .await
        .expect_err("Reorder should fail");

    assert_eq!(err.message(), "Erro ao reordenar menus");
    assert_eq!(orders(&items), orders(&root_menu()));
}

#[tokio::test]
async fn test_mismatched_siblings_send_nothing() {
    let mut server = mockito::Server::new_async().await;
    let any_write = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let api = client_for(&server);
    for ordered in [vec![1, 2], vec![1, 2, 3, 4], vec![1, 1, 2, 3], vec![3, 2, 1, 99]] {
        let mut items = root_menu();
        let err = menu::reorder(&api, &mut items, None, &ordered)
            .await
            .expect_err("Reorder should be refused");
        assert!(matches!(err, ApiError::Validation { .. }));
        assert_eq!(orders(&items), orders(&root_menu()));
    }
    any_write.assert_async().await;
}

#[tokio::test]
async fn test_nested_level_reorders_independently() {
    let mut server = mockito::Server::new_async().await;
    let child = server
        .mock("PUT", "/Menus/5")
        .match_body(Matcher::PartialJson(json!({ "parentId": 1, "order": 1 })))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let other = server
        .mock("PUT", "/Menus/4")
        .match_body(Matcher::PartialJson(json!({ "order": 2 })))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let api = client_for(&server);
    let mut items = root_menu();
    items.push(menu_item(5, Some(1), 2));
    menu::reorder(&api, &mut items, Some(1), &[5, 4])
        .await
        .expect("Reorder should succeed");

    assert_eq!(orders(&items)[..3], [(1, 1), (2, 2), (3, 3)]);
    child.assert_async().await;
    other.assert_async().await;
}
