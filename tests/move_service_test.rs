//! Tests for the move-resolution HTTP service, with a scripted completion
//! backend instead of a live provider.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::{Arc, Mutex};
use tictactoe_arena::{
    router, Board, Completion, CompletionError, Mark, MoveRequest, MoveResponse,
    MOVE_ENDPOINT_PATH,
};
use tower::ServiceExt;

/// Completion that replays a fixed reply (or failure) and records what it
/// was asked.
struct ScriptedCompletion {
    reply: Result<String, String>,
    calls: Mutex<Vec<(String, String, String)>>,
}

impl ScriptedCompletion {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err("scripted provider failure".to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait::async_trait]
impl Completion for ScriptedCompletion {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
        model: &str,
    ) -> Result<String, CompletionError> {
        self.calls.lock().unwrap().push((
            system_prompt.to_string(),
            user_message.to_string(),
            model.to_string(),
        ));
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(CompletionError::new(message.clone())),
        }
    }
}

fn board(json: &str) -> Board {
    serde_json::from_str(json).expect("valid board JSON")
}

async fn post_move(
    completion: Arc<ScriptedCompletion>,
    request: &MoveRequest,
) -> (StatusCode, serde_json::Value) {
    let app = router(completion);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(MOVE_ENDPOINT_PATH)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(request).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

#[tokio::test]
async fn test_valid_reply_is_returned_verbatim() {
    let completion = ScriptedCompletion::replying("4");
    let request = MoveRequest {
        board: Board::new(),
        player: Mark::X,
        model: "gpt-4".to_string(),
    };

    let (status, body) = post_move(completion.clone(), &request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["move"], 4);

    // The prompt carries the fixed legend and the board JSON; the model id
    // passes through verbatim.
    let calls = completion.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (system, user, model) = &calls[0];
    assert!(system.contains("0 | 1 | 2"));
    assert!(system.contains("player \"X\""));
    assert!(user.contains("[null,null,null,null,null,null,null,null,null]"));
    assert_eq!(model, "gpt-4");
}

#[tokio::test]
async fn test_whitespace_around_reply_is_tolerated() {
    let completion = ScriptedCompletion::replying("  7\n");
    let request = MoveRequest {
        board: Board::new(),
        player: Mark::O,
        model: "gpt-3.5-turbo".to_string(),
    };

    let (status, body) = post_move(completion, &request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["move"], 7);
}

#[tokio::test]
async fn test_garbage_reply_falls_back_to_random_empty_cell() {
    let completion = ScriptedCompletion::replying("I'll take the center!");
    let request = MoveRequest {
        board: board(r#"["X","O","X","O","X",null,null,null,null]"#),
        player: Mark::O,
        model: "gpt-3.5-turbo".to_string(),
    };

    let (status, body) = post_move(completion, &request).await;
    assert_eq!(status, StatusCode::OK);
    let cell = body["move"].as_u64().unwrap() as usize;
    assert!([5, 6, 7, 8].contains(&cell), "cell {} is not empty", cell);
}

#[tokio::test]
async fn test_occupied_suggestion_falls_back() {
    let completion = ScriptedCompletion::replying("0");
    let request = MoveRequest {
        board: board(r#"["X","O","X","O","X",null,null,null,null]"#),
        player: Mark::O,
        model: "gpt-3.5-turbo".to_string(),
    };

    let (status, body) = post_move(completion, &request).await;
    assert_eq!(status, StatusCode::OK);
    let cell = body["move"].as_u64().unwrap() as usize;
    assert!([5, 6, 7, 8].contains(&cell), "cell {} is not empty", cell);
}

#[tokio::test]
async fn test_out_of_range_suggestion_falls_back() {
    let completion = ScriptedCompletion::replying("9");
    let request = MoveRequest {
        board: Board::new(),
        player: Mark::X,
        model: "gpt-3.5-turbo".to_string(),
    };

    let (status, body) = post_move(completion, &request).await;
    assert_eq!(status, StatusCode::OK);
    let cell = body["move"].as_u64().unwrap() as usize;
    assert!(cell < 9);
}

#[tokio::test]
async fn test_full_board_is_a_client_error() {
    let completion = ScriptedCompletion::replying("not a number");
    let request = MoveRequest {
        board: board(r#"["X","O","X","O","X","O","O","X","O"]"#),
        player: Mark::X,
        model: "gpt-3.5-turbo".to_string(),
    };

    let (status, body) = post_move(completion, &request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("No valid moves"));
}

#[tokio::test]
async fn test_provider_failure_is_a_server_error() {
    let completion = ScriptedCompletion::failing();
    let request = MoveRequest {
        board: Board::new(),
        player: Mark::X,
        model: "gpt-3.5-turbo".to_string(),
    };

    let (status, body) = post_move(completion, &request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_missing_model_defaults() {
    let completion = ScriptedCompletion::replying("4");
    let app = router(completion.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(MOVE_ENDPOINT_PATH)
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"board":[null,null,null,null,null,null,null,null,null],"player":"X"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let reply: MoveResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(reply.cell, 4);

    let calls = completion.calls.lock().unwrap();
    assert_eq!(calls[0].2, "gpt-3.5-turbo");
}
