use shelbyx::app::App;
use shelbyx::catalog::ViewCategory;
use shelbyx::config::Config;
use shelbyx::modal::{ModalController, ModalInput, ModalState};
use shelbyx::paginate::PagingPolicy;
use shelbyx::router::{self, Route, RouteV1};
use shelbyx::types::{AppEvent, BlobRecord};
use shelbyx::upload::WalletSession;

fn rec(path: &str, ts: i64) -> BlobRecord {
    BlobRecord {
        name: format!("@0xabc/{path}"),
        blob_name_suffix: path.to_string(),
        size: 100,
        creation_micros: Some(ts),
    }
}

fn three() -> Vec<BlobRecord> {
    vec![rec("a.png", 3), rec("b.png", 2), rec("c.png", 1)]
}

#[test]
fn arrows_walk_neighbours_and_stop_at_the_ends() {
    let visible = three();
    let mut modal = ModalController::default();
    modal.open("@0xabc/a.png");

    assert!(!modal.handle(ModalInput::ArrowLeft, &visible), "no wrap at start");
    assert_eq!(modal.open_name(), Some("@0xabc/a.png"));

    assert!(modal.handle(ModalInput::ArrowRight, &visible));
    assert!(modal.handle(ModalInput::ArrowRight, &visible));
    assert_eq!(modal.open_name(), Some("@0xabc/c.png"));
    assert_eq!(modal.position(&visible), Some((2, 3)));
    assert!(!modal.has_next(&visible));

    assert!(!modal.handle(ModalInput::ArrowRight, &visible), "no wrap at end");
    assert_eq!(modal.open_name(), Some("@0xabc/c.png"));

    assert!(modal.handle(ModalInput::Escape, &visible));
    assert_eq!(*modal.state(), ModalState::Closed);
    assert!(!modal.handle(ModalInput::Escape, &visible));
}

#[test]
fn backdrop_closes_and_key_names_map() {
    let visible = three();
    let mut modal = ModalController::default();
    modal.open("@0xabc/b.png");
    assert!(modal.handle(ModalInput::Backdrop, &visible));
    assert!(!modal.is_open());

    assert_eq!(ModalInput::from_key_name("Escape"), Some(ModalInput::Escape));
    assert_eq!(ModalInput::from_key_name("ArrowLeft"), Some(ModalInput::ArrowLeft));
    assert_eq!(ModalInput::from_key_name("ArrowRight"), Some(ModalInput::ArrowRight));
    assert_eq!(ModalInput::from_key_name("Enter"), None);
}

#[test]
fn blob_that_left_the_list_has_no_neighbours() {
    let mut modal = ModalController::default();
    modal.open("@0xabc/gone.png");
    let visible = three();
    assert_eq!(modal.position(&visible), None);
    assert!(!modal.handle(ModalInput::ArrowRight, &visible));
    assert!(modal.is_open());
}

#[test]
fn app_modal_follows_reveal_window_and_routes() {
    let cfg = Config {
        reveal_batch: 2,
        media_paging: PagingPolicy::Reveal,
        ..Config::for_web("0xabc")
    };
    let mut app = App::new(&cfg, WalletSession::disconnected());
    app.on_event(AppEvent::BlobsLoaded {
        account: "0xabc".into(),
        blobs: three(),
    });
    assert_eq!(app.visible().len(), 2);

    app.open_selected();
    assert!(app.modal_input(ModalInput::ArrowRight));
    // c.png is not revealed yet, so the modal stops at b.png
    assert!(!app.modal_input(ModalInput::ArrowRight));
    assert_eq!(app.modal().open_name(), Some("@0xabc/b.png"));
    assert_eq!(
        router::to_hash(&app.current_route()),
        "#/v1/blob/b.png"
    );

    assert!(app.modal_input(ModalInput::Escape));
    assert_eq!(app.current_route(), Route::V1(RouteV1::Home));
    assert_eq!(app.active(), ViewCategory::Media);
}
