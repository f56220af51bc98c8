use std::sync::{
  Arc,
  Mutex
};

use serde_json::{
  Value,
  json
};
use taskboard_sync::{
  HttpTaskApi,
  Operation,
  SyncError,
  TaskApi,
  TaskDraft,
  TaskStatus
};
use tokio::io::{
  AsyncReadExt,
  AsyncWriteExt
};
use tokio::net::{
  TcpListener,
  TcpStream
};

#[derive(Debug, Clone)]
struct Seen {
  method:       String,
  path:         String,
  content_type: Option<String>,
  body:         String
}

struct Reply {
  status: u16,
  body:   String
}

fn reply(status: u16, body: Value) -> Reply {
  Reply {
    status,
    body: body.to_string()
  }
}

/// Answers one scripted reply per connection, then stops.
async fn serve(
  replies: Vec<Reply>
) -> (String, Arc<Mutex<Vec<Seen>>>) {
  let listener = TcpListener::bind("127.0.0.1:0")
    .await
    .expect("bind loopback");
  let addr = listener.local_addr().expect("local addr");
  let seen = Arc::new(Mutex::new(Vec::new()));
  let log = Arc::clone(&seen);

  tokio::spawn(async move {
    for reply in replies {
      let Ok((mut stream, _)) = listener.accept().await else {
        return;
      };
      let request = read_request(&mut stream).await;
      log.lock().expect("request log").push(request);
      let response = format!(
        "HTTP/1.1 {} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        reply.status,
        if reply.status < 400 { "OK" } else { "Error" },
        reply.body.len(),
        reply.body
      );
      let _ = stream.write_all(response.as_bytes()).await;
      let _ = stream.shutdown().await;
    }
  });

  (format!("http://{addr}/api/tasks/"), seen)
}

async fn read_request(stream: &mut TcpStream) -> Seen {
  let mut buf = Vec::new();
  let mut chunk = [0u8; 1024];

  let head_end = loop {
    let n = stream.read(&mut chunk).await.expect("read request");
    assert!(n > 0, "client closed before sending headers");
    buf.extend_from_slice(&chunk[..n]);
    if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
      break pos;
    }
  };

  let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
  let mut lines = head.lines();
  let request_line = lines.next().unwrap_or_default();
  let mut parts = request_line.split_whitespace();
  let method = parts.next().unwrap_or_default().to_string();
  let path = parts.next().unwrap_or_default().to_string();

  let mut content_length = 0usize;
  let mut content_type = None;
  for line in lines {
    if let Some((key, value)) = line.split_once(':') {
      let key = key.trim().to_ascii_lowercase();
      if key == "content-length" {
        content_length = value.trim().parse().unwrap_or(0);
      } else if key == "content-type" {
        content_type = Some(value.trim().to_string());
      }
    }
  }

  let body_start = head_end + 4;
  while buf.len() < body_start + content_length {
    let n = stream.read(&mut chunk).await.expect("read body");
    if n == 0 {
      break;
    }
    buf.extend_from_slice(&chunk[..n]);
  }
  let body = String::from_utf8_lossy(&buf[body_start..]).to_string();

  Seen {
    method,
    path,
    content_type,
    body
  }
}

fn recorded(seen: &Arc<Mutex<Vec<Seen>>>) -> Vec<Seen> {
  seen.lock().expect("request log").clone()
}

#[tokio::test]
async fn list_decodes_backend_tasks() {
  let (url, seen) = serve(vec![reply(
    200,
    json!([
      { "_id": "1", "title": "Buy milk", "description": "2%", "status": "pending" },
      { "_id": "2", "title": "Pay rent", "description": "June", "status": "in progress" }
    ])
  )])
  .await;
  let api = HttpTaskApi::new(url);

  let tasks = api.list().await.expect("list tasks");
  assert_eq!(tasks.len(), 2);
  assert_eq!(tasks[1].status, TaskStatus::InProgress);

  let requests = recorded(&seen);
  assert_eq!(requests[0].method, "GET");
  assert_eq!(requests[0].path, "/api/tasks");
}

#[tokio::test]
async fn create_posts_json_draft() {
  let (url, seen) = serve(vec![reply(
    201,
    json!({ "_id": "9", "title": "A", "description": "B", "status": "pending" })
  )])
  .await;
  let api = HttpTaskApi::new(url);

  let created = api
    .create(&TaskDraft::new("A", "B", TaskStatus::Pending))
    .await
    .expect("create task");
  assert_eq!(created.id, "9");

  let requests = recorded(&seen);
  assert_eq!(requests[0].method, "POST");
  assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
  let body: Value = serde_json::from_str(&requests[0].body).expect("json body");
  assert_eq!(body, json!({ "title": "A", "description": "B", "status": "pending" }));
}

#[tokio::test]
async fn update_and_delete_target_item_urls() {
  let (url, seen) = serve(vec![
    reply(200, json!({ "_id": "7", "title": "T", "description": "D", "status": "completed" })),
    reply(200, json!({ "message": "deleted" })),
  ])
  .await;
  let api = HttpTaskApi::new(url);

  let updated = api
    .update("7", &TaskDraft::new("T", "D", TaskStatus::Completed))
    .await
    .expect("update task");
  assert_eq!(updated.status, TaskStatus::Completed);
  api.delete("7").await.expect("delete task");

  let requests = recorded(&seen);
  assert_eq!(requests[0].method, "PUT");
  assert_eq!(requests[0].path, "/api/tasks/7");
  assert_eq!(requests[1].method, "DELETE");
  assert_eq!(requests[1].path, "/api/tasks/7");
  assert!(requests[1].body.is_empty());
}

#[tokio::test]
async fn non_success_status_is_a_failure() {
  let (url, _seen) = serve(vec![reply(500, json!({ "error": "boom" }))]).await;
  let api = HttpTaskApi::new(url);

  let err = api.delete("1").await.expect_err("server error");
  assert_eq!(
    err,
    SyncError::Status { operation: Operation::Delete, status: 500 }
  );
}

#[tokio::test]
async fn unreadable_body_is_a_decode_failure() {
  let (url, _seen) = serve(vec![reply(200, json!({ "not": "a list" }))]).await;
  let api = HttpTaskApi::new(url);

  let err = api.list().await.expect_err("wrong shape");
  assert!(matches!(
    err,
    SyncError::Decode { operation: Operation::Load, .. }
  ));
}

#[tokio::test]
async fn refused_connection_is_a_network_failure() {
  let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
  let addr = listener.local_addr().expect("local addr");
  drop(listener);

  let api = HttpTaskApi::new(format!("http://{addr}/api/tasks"));
  let err = api.list().await.expect_err("nothing listening");
  assert!(matches!(err, SyncError::Network(ref msg) if !msg.is_empty()));
}
