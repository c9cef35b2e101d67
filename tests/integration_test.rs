// Integration tests for user-admin

use chrono::NaiveDate;
use httpmock::prelude::*;
use serde_json::json;

use user_admin::api::ApiClient;
use user_admin::app::{AppState, Theme};
use user_admin::auth::AuthGate;
use user_admin::backend::local::LocalBackend;
use user_admin::backend::remote::RemoteBackend;
use user_admin::backend::Backend;
use user_admin::config::{ConfigPaths, Settings};
use user_admin::error::AdminError;
use user_admin::model::{Photo, Status, UserFields};
use user_admin::report::{DateRange, ExportFormat, ExportRequest, ReportKind};
use user_admin::search::ListFilter;
use user_admin::storage::ClientStorage;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 7, 31).unwrap()
}

fn user_json(id: u64, name: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "status": status,
        "created_at": "2023-07-02T09:00:00.000000Z"
    })
}

// 1) Theme config roundtrip and init
#[test]
fn theme_roundtrip_and_init() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("theme.conf");

    let t = Theme::mocha();
    t.write_file(&path).expect("write theme");
    let t2 = Theme::from_file(&path).expect("read theme");
    assert_eq!(format!("{:?}", t.text), format!("{:?}", t2.text));
    assert_eq!(format!("{:?}", t.error), format!("{:?}", t2.error));
    assert_eq!(format!("{:?}", t.header_bg), format!("{:?}", t2.header_bg));

    let p2 = dir.path().join("theme_init.conf");
    let _created = Theme::load_or_init(&p2);
    assert!(p2.exists());
}

// 1b) A hand-edited theme with a non-ASCII colour keeps the default for that key
#[test]
fn theme_with_non_ascii_colour_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("theme.conf");
    std::fs::write(&path, "text = a\u{e9}bcd\nerror = #102030\n").unwrap();

    let theme = Theme::from_file(&path).expect("read theme");
    assert_eq!(format!("{:?}", theme.text), format!("{:?}", Theme::mocha().text));
    assert_eq!(
        format!("{:?}", theme.error),
        format!("{:?}", ratatui::style::Color::Rgb(0x10, 0x20, 0x30))
    );
}

// 2) Settings, keybinds and filters are created on first start and read back
#[test]
fn config_files_bootstrap_state() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ConfigPaths::resolve(Some(dir.path()));
    std::fs::write(paths.filters(), "status = inactive\npage_size = 3\n").unwrap();
    std::fs::write(paths.keybinds(), "Quit = Ctrl+x\n").unwrap();

    let (settings, _) = Settings::load_or_init(&paths);
    assert!(paths.settings().exists());
    assert_eq!(settings.api_url, None);

    let auth = AuthGate::new(ClientStorage::new(paths.storage_dir()));
    let app = AppState::bootstrap(
        Box::new(LocalBackend::with_demo_data()),
        auth,
        settings,
        &paths,
    );
    assert!(paths.theme().exists());
    assert_eq!(app.status_filter, Some(Status::Inactive));
    assert_eq!(app.rows_per_page, 3);
    assert!(app.keymap.keys_for(user_admin::app::keymap::KeyAction::Quit).contains(&"Ctrl+x".to_string()));
}

// 3) Login persists a session that a fresh gate restores
#[test]
fn local_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let storage_dir = dir.path().join("storage");

    let mut backend = LocalBackend::with_demo_data();
    let mut gate = AuthGate::new(ClientStorage::new(&storage_dir));
    assert!(matches!(
        gate.login(&mut backend, "admin", "wrong"),
        Err(AdminError::InvalidCredentials)
    ));
    let user = gate.login(&mut backend, "admin", "admin").unwrap();
    assert_eq!(user.email, "admin@example.com");

    let mut backend2 = LocalBackend::with_demo_data();
    let mut gate2 = AuthGate::new(ClientStorage::new(&storage_dir));
    gate2.restore(&mut backend2);
    assert!(gate2.is_authenticated());
    assert_eq!(backend2.token(), Some("demo-token-123456"));

    gate2.logout(&mut backend2);
    let mut gate3 = AuthGate::new(ClientStorage::new(&storage_dir));
    gate3.restore(&mut backend2);
    assert!(!gate3.is_authenticated());
}

// 4) Local exports land in the target directory with the expected name
#[test]
fn local_export_saves_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = LocalBackend::with_demo_data();
    let req = ExportRequest::new(ReportKind::Users, ExportFormat::Pdf, DateRange::ThisYear);
    let export = backend.export(&req, today()).unwrap();
    let path = export.save(&dir.path().join("out")).unwrap();
    assert_eq!(path.file_name().unwrap(), "users_export_thisYear_2023-07-31.pdf");
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.4"));
}

// 5) Requests carry the bearer token and JSON accept header
#[test]
fn api_sends_bearer_token() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/users/3")
            .header("authorization", "Bearer tok-1")
            .header("accept", "application/json");
        then.status(200).json_body(json!({ "data": user_json(3, "Ann", "active") }));
    });

    let mut client = ApiClient::new(&server.base_url()).unwrap();
    client.set_token(Some("tok-1".into()));
    let user = client.get_user(3).unwrap();

    mock.assert();
    assert_eq!(user.id, 3);
    assert_eq!(user.created_date(), "2023-07-02");
}

// 6) 401 / 404 / 422 map to domain errors
#[test]
fn api_maps_error_statuses() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/users/stats");
        then.status(401).json_body(json!({ "message": "Unauthenticated." }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/users/77");
        then.status(404);
    });
    server.mock(|when, then| {
        when.method(POST).path("/users");
        then.status(422).json_body(json!({
            "message": "The given data was invalid.",
            "errors": { "email": ["The email has already been taken."] }
        }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/auth/login");
        then.status(401);
    });

    let client = ApiClient::new(&server.base_url()).unwrap();
    assert!(matches!(client.stats(), Err(AdminError::Unauthorized)));
    assert!(matches!(client.get_user(77), Err(AdminError::NotFound { id: 77 })));
    let fields = UserFields {
        name: "Dup".into(),
        email: "dup@example.com".into(),
        ..Default::default()
    };
    match client.create_user(&fields) {
        Err(AdminError::Validation { field, message }) => {
            assert_eq!(field, "email");
            assert_eq!(message, "The email has already been taken.");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(
        client.login("a@example.com", "x"),
        Err(AdminError::InvalidCredentials)
    ));
}

// 7) Paged lists are followed to the last page; bare arrays are one page
#[test]
fn api_lists_follow_pages() {
    let server = MockServer::start();
    let p1 = server.mock(|when, then| {
        when.method(GET).path("/users").query_param("page", "1").query_param("status", "active");
        then.status(200).json_body(json!({
            "data": [user_json(1, "Ann", "active"), user_json(2, "Bob", "active")],
            "current_page": 1,
            "last_page": 2,
            "total": 3
        }));
    });
    let p2 = server.mock(|when, then| {
        when.method(GET).path("/users").query_param("page", "2");
        then.status(200).json_body(json!({
            "data": [user_json(3, "Cid", "active")],
            "current_page": 2,
            "last_page": 2,
            "total": 3
        }));
    });

    let client = ApiClient::new(&server.base_url()).unwrap();
    let users = client
        .list_users(&ListFilter::new("", Some(Status::Active)))
        .unwrap();
    p1.assert();
    p2.assert();
    let ids: Vec<u64> = users.iter().map(|u| u.id).collect();
    assert_eq!(ids, [1, 2, 3]);

    let bare = MockServer::start();
    bare.mock(|when, then| {
        when.method(GET).path("/users");
        then.status(200).json_body(json!([user_json(9, "Zed", "inactive")]));
    });
    let client = ApiClient::new(&bare.base_url()).unwrap();
    let users = client.list_users(&ListFilter::default()).unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].status, Status::Inactive);
}

// 8) Remote login stores the session and later calls use its token
#[test]
fn remote_login_and_logout_flow() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/auth/login")
            .json_body(json!({ "email": "ops@example.com", "password": "s3cret" }));
        then.status(200).json_body(json!({
            "user": { "id": 5, "name": "Ops", "email": "ops@example.com", "role": "admin" },
            "token": "remote-token"
        }));
    });
    let stats = server.mock(|when, then| {
        when.method(GET)
            .path("/users/stats")
            .header("authorization", "Bearer remote-token");
        then.status(200).json_body(json!({
            "totalUsers": 2,
            "activeUsers": 1,
            "inactiveUsers": 1,
            "newUsersThisMonth": 0,
            "usersByMonth": [{ "month": "Mar", "count": 2 }]
        }));
    });
    let logout = server.mock(|when, then| {
        when.method(POST).path("/auth/logout");
        then.status(500);
    });

    let dir = tempfile::tempdir().unwrap();
    let mut backend = RemoteBackend::new(&server.base_url()).unwrap();
    let mut gate = AuthGate::new(ClientStorage::new(dir.path()));
    gate.login(&mut backend, "ops@example.com", "s3cret").unwrap();

    let s = backend.stats(today()).unwrap();
    stats.assert();
    assert_eq!(s.total_users, 2);
    assert_eq!(s.users_by_month.len(), 12);
    assert_eq!(s.users_by_month[2].count, 2);

    // A failing logout request still ends the session locally.
    gate.logout(&mut backend);
    logout.assert();
    assert!(!gate.is_authenticated());
    assert!(backend.token().is_none());
}

// 9) Uploads go out as multipart with the photo part
#[test]
fn remote_create_sends_multipart_photo() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/users")
            .body_includes("name=\"photo\"")
            .body_includes("name=\"email\"");
        then.status(201).json_body(json!({ "data": user_json(11, "Pix", "active") }));
    });

    let mut backend = RemoteBackend::new(&server.base_url()).unwrap();
    let fields = UserFields {
        name: "Pix".into(),
        email: "pix@example.com".into(),
        photo: Some(Photo::Inline {
            content_type: "image/png".into(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }),
        ..Default::default()
    };
    let created = backend.create_user(fields, today()).unwrap();
    mock.assert();
    assert_eq!(created.id, 11);
}

// 10) Full-range users exports come from the server; ranged ones are rendered locally
#[test]
fn remote_export_paths() {
    let server = MockServer::start();
    let blob = server.mock(|when, then| {
        when.method(GET).path("/users/export/csv");
        then.status(200)
            .header("content-type", "text/csv")
            .body("ID,Name\n1,Server\n");
    });
    server.mock(|when, then| {
        when.method(GET).path("/users");
        then.status(200).json_body(json!([
            user_json(1, "Ann", "active"),
            {
                "id": 2, "name": "Old", "email": "old@example.com",
                "status": "active", "created_at": "2022-01-01"
            }
        ]));
    });

    let mut backend = RemoteBackend::new(&server.base_url()).unwrap();
    let all = backend.export(&ExportRequest::default(), today()).unwrap();
    blob.assert();
    assert_eq!(all.bytes, b"ID,Name\n1,Server\n");

    let req = ExportRequest::new(ReportKind::Users, ExportFormat::Csv, DateRange::ThisMonth);
    let month = backend.export(&req, today()).unwrap();
    let text = String::from_utf8(month.bytes).unwrap();
    assert!(text.contains("Ann"));
    assert!(!text.contains("Old"));
    assert_eq!(blob.calls(), 1);
}

// 11) The signed-in identity can be fetched back from the server
#[test]
fn api_current_user() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/auth/user")
            .header("authorization", "Bearer tok-9");
        then.status(200)
            .json_body(json!({ "id": 5, "name": "Ops", "email": "ops@example.com", "role": "admin" }));
    });

    let mut client = ApiClient::new(&server.base_url()).unwrap();
    client.set_token(Some("tok-9".into()));
    let user = client.current_user().unwrap();
    mock.assert();
    assert_eq!(user.email, "ops@example.com");
    assert!(user.is_admin());
}
