use axum::body::Body;
use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, ORIGIN};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use clap::Parser;
use playout_dispatch::{
	envelope::{DEFAULT_DATA_FORMAT, DEFAULT_TEMPLATE_PATH},
	Addressing, ControllerEvent, Directive, Focus, ItemAction, Notification, Outbound, OutboundReceiver, PlayAction, RendererEvent,
};
use playout_relay::{app, AppState, Config};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

struct Harness {
	state: AppState,
	outbound: OutboundReceiver,
	_dataroot: tempfile::TempDir,
}

impl Harness {
	fn new(servers: &[&str]) -> Self {
		let dataroot = tempfile::tempdir().unwrap();
		let mut args = vec!["playout_relay".to_string(), "--dataroot".to_string(), dataroot.path().display().to_string()];
		for server in servers {
			args.push("--caspar-server".to_string());
			args.push((*server).to_string());
		}

		let config = Config::try_parse_from(args).unwrap();
		let (state, outbound) = AppState::build(Arc::new(config), CancellationToken::new()).unwrap();

		Self {
			state,
			outbound,
			_dataroot: dataroot,
		}
	}

	fn dataroot(&self) -> PathBuf {
		self.state.core.config.dataroot.clone()
	}

	async fn get(&self, uri: &str) -> Response {
		let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
		app(self.state.clone()).oneshot(request).await.unwrap()
	}

	async fn post_json(&self, uri: &str, body: &Value) -> Response {
		let request = Request::builder()
			.method(Method::POST)
			.uri(uri)
			.header(CONTENT_TYPE, "application/json")
			.body(Body::from(body.to_string()))
			.unwrap();
		app(self.state.clone()).oneshot(request).await.unwrap()
	}

	fn next_playout(&mut self) -> playout_dispatch::PlayoutCommand {
		match self.outbound.try_recv() {
			Ok(Outbound::Playout(command)) => command,
			other => panic!("expected a queued playout command, got {other:?}"),
		}
	}
}

async fn body_text(response: Response) -> String {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
	String::from_utf8(bytes.to_vec()).unwrap()
}

fn seed_rundown(path: &Path, ids: &[&str]) {
	std::fs::create_dir_all(path.parent().unwrap()).unwrap();
	let templates: Vec<_> = ids.iter().map(|id| json!({"itemID": id, "onair": "false"})).collect();
	let doc = json!({"templates": templates, "updated": "2021-03-25T19:56:40.909Z"});
	std::fs::write(path, serde_json::to_vec_pretty(&doc).unwrap()).unwrap();
}

#[tokio::test]
async fn test_invoke_without_addressing_uses_defaults() {
	let mut harness = Harness::new(&[]);

	let response = harness.get("/api/v1/invokeTemplateFunction?function=myCustomTemplateFunction&params=Hello%20World").await;
	assert_eq!(response.status(), StatusCode::OK);
	assert!(body_text(response).await.starts_with("Sent request to playout server: {"));

	let command = harness.next_playout();
	assert_eq!(command.addressing, Some(Addressing::default()));
	assert_eq!(
		command.directive,
		Directive::Invoke {
			expression: "myCustomTemplateFunction(\"Hello%20World\")".into()
		}
	);
}

#[tokio::test]
async fn test_invoke_with_addressing() {
	let mut harness = Harness::new(&[]);

	let response = harness.get("/api/v1/invokeTemplateFunction?playserver=FILL&playchannel=2&playlayer=19&webplayout=19&function=update").await;
	assert_eq!(response.status(), StatusCode::OK);

	let addressing = harness.next_playout().addressing.unwrap();
	assert_eq!(addressing.server, "FILL");
	assert_eq!(addressing.channel, "2");
	assert_eq!(addressing.layer, "19");
	assert_eq!(addressing.web_layer, "19");
}

#[tokio::test]
async fn test_invoke_without_function_is_rejected() {
	let mut harness = Harness::new(&[]);

	let response = harness.get("/api/v1/invokeTemplateFunction?params=x").await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert!(harness.outbound.try_recv().is_err());
}

#[tokio::test]
async fn test_direct_playout_empty_body_uses_defaults() {
	let mut harness = Harness::new(&[]);

	let response = harness.post_json("/api/v1/directplayout", &json!({})).await;
	assert_eq!(response.status(), StatusCode::OK);

	let command = harness.next_playout();
	assert_eq!(command.addressing, Some(Addressing::default()));
	match command.directive {
		Directive::Content {
			template_path,
			data_format,
			fields,
			action,
		} => {
			assert_eq!(template_path, DEFAULT_TEMPLATE_PATH);
			assert_eq!(data_format, DEFAULT_DATA_FORMAT);
			assert!(!fields.is_empty());
			assert_eq!(action, PlayAction::Play);
		}
		other => panic!("unexpected directive {other:?}"),
	}
}

#[tokio::test]
async fn test_direct_playout_accepts_numeric_layers() {
	let mut harness = Harness::new(&[]);
	let body = json!({
		"casparServer": "OVERLAY",
		"casparChannel": 1,
		"casparLayer": 20,
		"webplayoutLayer": "20",
		"relativeTemplatePath": "/vendor/pack/lower_third.html",
		"DataFields": [{"field": "f0", "value": "Lorem"}, {"field": "f1", "value": "Ipsum"}],
		"command": "stop"
	});

	let response = harness.post_json("/api/v1/directplayout", &body).await;
	assert_eq!(response.status(), StatusCode::OK);

	let command = harness.next_playout();
	assert_eq!(command.addressing.as_ref().unwrap().layer, "20");
	assert_eq!(command.command_name(), "stop");
}

#[tokio::test]
async fn test_direct_playout_get_is_not_found() {
	let harness = Harness::new(&[]);

	let response = harness.get("/api/v1/directplayout").await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
	assert!(body_text(response).await.starts_with("Sorry, this endpoint only available as POST REQUEST"));
}

#[tokio::test]
async fn test_control_rundown_item_by_reference() {
	let mut harness = Harness::new(&[]);

	let response = harness.get("/api/v1/controlRundownItemByID?file=HelloWorld-project/Show&item=1616702200909&command=continue").await;
	assert_eq!(response.status(), StatusCode::OK);

	let command = harness.next_playout();
	assert!(command.addressing.is_none());
	assert_eq!(
		command.directive,
		Directive::Reference {
			datafile: harness.dataroot().join("HelloWorld-project").join("data").join("Show.json"),
			epoch: "1616702200909".into(),
			action: PlayAction::Continue,
		}
	);
}

#[tokio::test]
async fn test_control_rundown_item_bad_path_is_server_error() {
	let mut harness = Harness::new(&[]);

	let response = harness.get("/api/v1/controlRundownItemByID?file=NoFolder&item=1&command=play").await;
	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	assert!(body_text(response).await.starts_with("Error in /api/v1/controlRundownItemByID: "));
	assert!(harness.outbound.try_recv().is_err());
}

#[tokio::test]
async fn test_item_play_by_id_reaches_controller() {
	let harness = Harness::new(&[]);
	let mut events = harness.state.dispatch.hub.subscribe();

	let response = harness.get("/api/v1/item/play/42").await;
	assert_eq!(response.status(), StatusCode::OK);
	assert!(body_text(response).await.starts_with("Sent request to controller: "));

	let event = events.try_recv().unwrap();
	assert_eq!(event, Notification::Controller(ControllerEvent::item(ItemAction::Play, Some("42".into()))));
}

#[tokio::test]
async fn test_rundown_navigation_events() {
	let harness = Harness::new(&[]);
	let mut events = harness.state.dispatch.hub.subscribe();

	harness.get("/api/v1/rundown/load?file=MyFirstProject/MyFirstRundown").await;
	harness.get("/api/v1/rundown/focusNext").await;
	harness.get("/api/v1/item/stop").await;

	assert_eq!(
		events.try_recv().unwrap(),
		Notification::Controller(ControllerEvent::load(Some("MyFirstProject/MyFirstRundown".into())))
	);
	assert_eq!(events.try_recv().unwrap(), Notification::Controller(ControllerEvent::focus(Focus::Next)));
	assert_eq!(events.try_recv().unwrap(), Notification::Controller(ControllerEvent::item(ItemAction::Stop, None)));
}

#[tokio::test]
async fn test_panic_without_backends() {
	let mut harness = Harness::new(&[]);
	let mut events = harness.state.dispatch.hub.subscribe();

	let response = harness.get("/api/v1/panic").await;
	assert_eq!(response.status(), StatusCode::OK);
	let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
	assert_eq!(body, json!({"message": "Panic executed. Layers cleared forcefully."}));

	assert_eq!(events.try_recv().unwrap(), Notification::Renderer(RendererEvent::clear_all_layers()));
	assert_eq!(events.try_recv().unwrap(), Notification::Controller(ControllerEvent::all_states_to_stopped()));
	assert!(harness.outbound.try_recv().is_err());
}

#[tokio::test]
async fn test_panic_with_backends_issues_one_clear() {
	let mut harness = Harness::new(&["OVERLAY=127.0.0.1:5250"]);

	let response = harness.get("/api/v1/panic?server=OVERLAY").await;
	assert_eq!(response.status(), StatusCode::OK);

	assert_eq!(
		harness.outbound.try_recv().unwrap(),
		Outbound::ClearChannels {
			server: Some("OVERLAY".into())
		}
	);
	assert!(harness.outbound.try_recv().is_err());
}

#[tokio::test]
async fn test_change_item_id_ok_then_conflict() {
	let harness = Harness::new(&[]);
	let path = harness.dataroot().join("Project").join("data").join("Show.json");
	seed_rundown(&path, &["A", "B"]);

	let response = harness.get(&format!("/api/v1/changeItemID?rundownfile={}&ID=A&newID=C", path.display())).await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_text(response).await, "ID changed to C");

	let before = std::fs::read(&path).unwrap();
	let response = harness.get(&format!("/api/v1/changeItemID?rundownfile={}&ID=B&newID=C", path.display())).await;
	assert_eq!(response.status(), StatusCode::CONFLICT);
	assert_eq!(body_text(response).await, "ID not changed");
	assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[tokio::test]
async fn test_change_item_id_missing_document() {
	let harness = Harness::new(&[]);

	let response = harness.get("/api/v1/changeItemID?ID=A&newID=B").await;
	assert_eq!(response.status(), StatusCode::CONFLICT);
	assert_eq!(body_text(response).await, "ID not changed");
}

#[tokio::test]
async fn test_feed_proxy_failure_is_json_error() {
	let harness = Harness::new(&[]);

	let response = harness.get("/api/v1/feedproxy?url=notaurl&format=xml").await;
	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

	let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
	assert_eq!(body["type"], "error");
	assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn test_feed_proxy_passes_body_through() {
	const FEED: &str = "<rss version=\"2.0\"><channel><title>Scores</title></channel></rss>";

	let upstream = axum::Router::new().route("/feed", axum::routing::get(|| async { FEED }));
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	tokio::spawn(async move { axum::serve(listener, upstream).await });

	let harness = Harness::new(&[]);
	for (format, content_type) in [("xml", "application/rss+xml"), ("json", "application/json")] {
		let request = Request::builder()
			.uri(format!("/api/v1/feedproxy?url=http://{addr}/feed&format={format}"))
			.header(ORIGIN, "http://overlay.local")
			.body(Body::empty())
			.unwrap();
		let response = app(harness.state.clone()).oneshot(request).await.unwrap();

		assert_eq!(response.status(), StatusCode::OK, "{format}");
		assert_eq!(response.headers()[CONTENT_TYPE], content_type);
		assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
		assert_eq!(body_text(response).await, FEED);
	}
}

#[tokio::test]
async fn test_catalog_and_health() {
	let harness = Harness::new(&[]);

	let response = harness.get("/api/v1").await;
	assert_eq!(response.status(), StatusCode::OK);
	let catalog: Value = serde_json::from_str(&body_text(response).await).unwrap();
	assert_eq!(catalog["sections"][0]["section"], "Direct commands");

	let response = harness.get("/health").await;
	assert_eq!(response.status(), StatusCode::OK);
	let health: Value = serde_json::from_str(&body_text(response).await).unwrap();
	assert_eq!(health["status"], "healthy");
}
