//! Tests for the HTTP move resolver against scripted move services.

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use std::collections::HashMap;
use tictactoe_arena::{
    Board, HttpResolver, Mark, MoveResolver, ResolveError, MOVE_ENDPOINT_PATH,
};

fn board(json: &str) -> Board {
    serde_json::from_str(json).expect("valid board JSON")
}

/// Spawns a router on an ephemeral port, returning the base URL.
async fn spawn_service(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn service_replying(cell: usize) -> Router {
    Router::new().route(
        MOVE_ENDPOINT_PATH,
        post(move || async move { Json(json!({ "move": cell })) }),
    )
}

fn service_failing() -> Router {
    Router::new().route(
        MOVE_ENDPOINT_PATH,
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to process AI move" })),
            )
        }),
    )
}

fn service_malformed() -> Router {
    Router::new().route(MOVE_ENDPOINT_PATH, post(|| async { "not json at all" }))
}

#[tokio::test]
async fn test_valid_suggestion_is_used() {
    // Empty board, player X, service replies 4.
    let base_url = spawn_service(service_replying(4)).await;
    let resolver = HttpResolver::new(base_url, "gpt-4");

    let cell = resolver.resolve(&Board::new(), Mark::X).await.unwrap();
    assert_eq!(cell, 4);
}

#[tokio::test]
async fn test_occupied_suggestion_triggers_fallback() {
    // [X,O,X,O,X,_,_,_,_], player O, service replies the occupied cell 0.
    let base_url = spawn_service(service_replying(0)).await;
    let resolver = HttpResolver::new(base_url, "gpt-3.5-turbo");
    let board = board(r#"["X","O","X","O","X",null,null,null,null]"#);

    for _ in 0..10 {
        let cell = resolver.resolve(&board, Mark::O).await.unwrap();
        assert!([5, 6, 7, 8].contains(&cell), "cell {} is not empty", cell);
    }
}

#[tokio::test]
async fn test_out_of_range_suggestion_triggers_fallback() {
    let base_url = spawn_service(service_replying(42)).await;
    let resolver = HttpResolver::new(base_url, "gpt-3.5-turbo");

    let cell = resolver.resolve(&Board::new(), Mark::X).await.unwrap();
    assert!(cell < 9);
}

#[tokio::test]
async fn test_service_error_with_single_empty_cell_is_deterministic() {
    let base_url = spawn_service(service_failing()).await;
    let resolver = HttpResolver::new(base_url, "gpt-3.5-turbo");
    let board = board(r#"["X","O","X","O","X","O","O","X",null]"#);

    for _ in 0..10 {
        assert_eq!(resolver.resolve(&board, Mark::O).await, Ok(8));
    }
}

#[tokio::test]
async fn test_service_error_fallback_is_roughly_uniform() {
    let base_url = spawn_service(service_failing()).await;
    let resolver = HttpResolver::new(base_url, "gpt-3.5-turbo");
    let board = board(r#"["X","O","X","O","X","O",null,null,null]"#);

    let mut counts: HashMap<usize, usize> = HashMap::new();
    for _ in 0..150 {
        let cell = resolver.resolve(&board, Mark::O).await.unwrap();
        assert!([6, 7, 8].contains(&cell), "cell {} is not empty", cell);
        *counts.entry(cell).or_default() += 1;
    }

    // Expected ~50 each; allow a wide statistical margin.
    for cell in [6, 7, 8] {
        let count = counts.get(&cell).copied().unwrap_or(0);
        assert!(count >= 10, "cell {} selected only {} times", cell, count);
    }
}

#[tokio::test]
async fn test_malformed_response_triggers_fallback() {
    let base_url = spawn_service(service_malformed()).await;
    let resolver = HttpResolver::new(base_url, "gpt-3.5-turbo");

    let cell = resolver.resolve(&Board::new(), Mark::X).await.unwrap();
    assert!(cell < 9);
}

#[tokio::test]
async fn test_unreachable_service_triggers_fallback() {
    // Nothing listens here; the connection error routes to the fallback.
    let resolver = HttpResolver::new("http://127.0.0.1:9", "gpt-3.5-turbo");

    let cell = resolver.resolve(&Board::new(), Mark::X).await.unwrap();
    assert!(cell < 9);
}

#[tokio::test]
async fn test_full_board_surfaces_no_empty_cell() {
    let base_url = spawn_service(service_failing()).await;
    let resolver = HttpResolver::new(base_url, "gpt-3.5-turbo");
    let board = board(r#"["X","O","X","O","X","O","O","X","O"]"#);

    assert_eq!(
        resolver.resolve(&board, Mark::X).await,
        Err(ResolveError::NoEmptyCell)
    );
}
