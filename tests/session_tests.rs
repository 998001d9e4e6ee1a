//! # Title Session Tests
//!
//! Drive a real `TitleSession` through a `NavigationBus`:
//! - navigation end triggers resolve → format → publish
//! - other router events are ignored
//! - untitled destinations keep the previous title
//! - teardown stops publishing and is safe to repeat

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use route_title::{
    template, DocumentTitle, EventKind, EventLog, NavigationBus, RouteSnapshot, RouteTable,
    RouteTitleConfig, RouterEvent, SegmentData, SharedSnapshot, TitleSession, ViewTitle,
};
use rustc_hash::FxHashMap;
use serde_json::json;

// ============================================================================
// TEST HELPERS
// ============================================================================

struct Harness {
    bus: NavigationBus,
    snapshots: SharedSnapshot,
    document: DocumentTitle,
    session: TitleSession,
    next_id: u64,
}

impl Harness {
    fn start() -> Self {
        Self::start_with(TitleSession::builder())
    }

    fn start_with(builder: route_title::TitleSessionBuilder) -> Self {
        let bus = NavigationBus::new(16);
        let snapshots = SharedSnapshot::new(RouteSnapshot::root());
        let document = DocumentTitle::new();
        let session = builder
            .start(
                Arc::new(document.clone()),
                bus.events(),
                Arc::new(snapshots.clone()),
            )
            .unwrap();
        Self {
            bus,
            snapshots,
            document,
            session,
            next_id: 0,
        }
    }

    /// Swap in `snapshot`, signal completion and wait for the pass to finish
    async fn navigate(&mut self, url: &str, snapshot: RouteSnapshot) {
        self.next_id += 1;
        self.snapshots.replace(snapshot);
        self.bus.emit(RouterEvent::NavigationEnd {
            id: self.next_id,
            url: url.to_string(),
        });
        let expected = self.next_id as usize;
        wait_until(|| self.session.navigations_handled() >= expected).await;
    }
}

async fn wait_until(mut done: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !done() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Give the subscription task a chance to run
async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

fn titled(label: &str) -> SegmentData {
    SegmentData::new().with_title(RouteTitleConfig::new(label))
}

fn course_lesson_chain() -> RouteSnapshot {
    RouteSnapshot::chain([SegmentData::new(), titled("Course"), titled("Lesson 3")])
}

fn untitled_chain() -> RouteSnapshot {
    RouteSnapshot::chain([SegmentData::new(), SegmentData::new()])
}

// ============================================================================
// PUBLISHING
// ============================================================================

#[tokio::test]
async fn navigation_end_publishes_first_label() {
    let mut h = Harness::start();
    h.navigate("/course/lessons/3", course_lesson_chain()).await;

    assert_eq!(h.document.current().as_deref(), Some("Course"));
    assert_eq!(h.session.get_title().as_deref(), Some("Course"));
}

#[tokio::test]
async fn template_formats_all_labels() {
    let mut h = Harness::start();
    let chain = RouteSnapshot::chain([
        SegmentData::new(),
        titled("Course"),
        SegmentData::new().with_title(
            RouteTitleConfig::new("Lesson 3").with_template(template(["", ": ", ""], [0usize, 1])),
        ),
    ]);
    h.navigate("/course/lessons/3", chain).await;

    assert_eq!(h.document.current().as_deref(), Some("Course: Lesson 3"));
}

#[tokio::test]
async fn resolver_data_feeds_the_title() {
    let mut h = Harness::start();
    let chain = RouteSnapshot::chain([
        SegmentData::new(),
        SegmentData::new()
            .with_title(
                RouteTitleConfig::new("Lesson Detail")
                    .with_resolver("lesson", "description")
                    .with_template(template(["", " | ", ""], [1usize, 0])),
            )
            .with_resolved("lesson", json!({"description": "Intro to Loops"})),
    ]);
    h.navigate("/lessons/1", chain).await;

    assert_eq!(h.document.current().as_deref(), Some("Intro to Loops | Lesson Detail"));
    let config = h.session.config();
    assert_eq!(config.titles[1].resolved, Some(json!({"description": "Intro to Loops"})));
}

#[tokio::test]
async fn non_end_events_are_ignored() {
    let h = Harness::start();
    h.snapshots.replace(course_lesson_chain());

    h.bus.emit(RouterEvent::NavigationStart {
        id: 1,
        url: "/course".into(),
    });
    h.bus.emit(RouterEvent::NavigationCancel {
        id: 1,
        url: "/course".into(),
        reason: "guard rejected".into(),
    });
    h.bus.emit(RouterEvent::NavigationError {
        id: 2,
        url: "/course".into(),
        error: "resolver failed".into(),
    });
    settle().await;

    assert_eq!(h.document.publish_count(), 0);
    assert_eq!(h.session.navigations_handled(), 0);
}

// ============================================================================
// STALE RETENTION
// ============================================================================

#[tokio::test]
async fn untitled_destination_keeps_previous_title() {
    let log = EventLog::new();
    let mut h = Harness::start_with(TitleSession::builder().event_log(log.clone()));
    h.navigate("/course/lessons/3", course_lesson_chain()).await;
    h.navigate("/untitled", untitled_chain()).await;

    assert_eq!(h.session.get_title().as_deref(), Some("Course"));
    assert_eq!(h.session.config().labels(), ["Course", "Lesson 3"]);
    assert_eq!(h.document.history(), ["Course", "Course"]);

    let retained = log
        .events()
        .into_iter()
        .filter(|e| matches!(e.kind, EventKind::TitlesRetained { .. }))
        .count();
    assert_eq!(retained, 1);
}

#[tokio::test]
async fn initial_title_survives_untitled_navigation() {
    let mut h = Harness::start_with(TitleSession::builder().initial_title("Angular Router Course"));
    assert_eq!(h.session.get_title().as_deref(), Some("Angular Router Course"));

    h.navigate("/nowhere", untitled_chain()).await;
    assert_eq!(h.document.current().as_deref(), Some("Angular Router Course"));
}

#[tokio::test]
async fn nothing_to_publish_without_titles() {
    let mut h = Harness::start();
    h.navigate("/nowhere", untitled_chain()).await;

    assert_eq!(h.document.publish_count(), 0);
    assert_eq!(h.session.get_title(), None);
}

// ============================================================================
// FORCED TITLES
// ============================================================================

#[tokio::test]
async fn set_title_ignores_missing_and_empty_labels() {
    let h = Harness::start();
    h.session.set_title(Some("Login"));
    h.session.set_title(None);
    h.session.set_title(Some(""));

    assert_eq!(h.document.history(), ["Login"]);
}

#[tokio::test]
async fn view_title_goes_through_the_handle() {
    let mut h = Harness::start();
    h.navigate("/course/lessons/3", course_lesson_chain()).await;

    ViewTitle::new("Edit Lesson").init(&h.session.handle());
    assert_eq!(h.document.current().as_deref(), Some("Edit Lesson"));
    // forcing a label doesn't touch the resolved state
    assert_eq!(h.session.get_title().as_deref(), Some("Course"));
}

// ============================================================================
// LIFECYCLE
// ============================================================================

#[tokio::test]
async fn teardown_twice_then_signals_publish_nothing() {
    let mut h = Harness::start();
    h.navigate("/course/lessons/3", course_lesson_chain()).await;
    assert_eq!(h.document.publish_count(), 1);

    h.session.teardown();
    h.session.teardown();
    assert!(!h.session.is_subscribed());

    h.snapshots.replace(RouteSnapshot::chain([SegmentData::new(), titled("Other")]));
    h.bus.emit(RouterEvent::NavigationEnd {
        id: 99,
        url: "/other".into(),
    });
    settle().await;

    assert_eq!(h.document.publish_count(), 1);
    assert_eq!(h.document.current().as_deref(), Some("Course"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn teardown_during_a_pass_blocks_later_signals() {
    let published = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = {
        let published = Arc::clone(&published);
        move |title: &str| {
            published.lock().push(title.to_string());
            if title == "First" {
                std::thread::sleep(Duration::from_millis(300));
            }
        }
    };

    let bus = NavigationBus::new(16);
    let snapshots = SharedSnapshot::new(RouteSnapshot::chain([SegmentData::new(), titled("First")]));
    let mut session =
        TitleSession::start(Arc::new(sink), bus.events(), Arc::new(snapshots.clone())).unwrap();

    bus.emit(RouterEvent::NavigationEnd {
        id: 1,
        url: "/first".into(),
    });
    // sink is now sleeping inside the first pass
    wait_until(|| published.lock().len() == 1).await;

    session.teardown();
    assert!(!session.is_subscribed());

    snapshots.replace(RouteSnapshot::chain([SegmentData::new(), titled("AfterTeardown")]));
    bus.emit(RouterEvent::NavigationEnd {
        id: 2,
        url: "/after".into(),
    });
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(*published.lock(), ["First"]);
    assert_eq!(session.navigations_handled(), 1);
}

#[tokio::test]
async fn session_without_event_log_keeps_no_events() {
    let mut h = Harness::start();
    h.navigate("/course/lessons/3", course_lesson_chain()).await;
    h.navigate("/untitled", untitled_chain()).await;

    assert!(h.session.events().is_none());
    assert_eq!(h.session.navigations_handled(), 2);
}

#[tokio::test]
async fn dropping_the_session_unsubscribes() {
    let bus = NavigationBus::new(4);
    let session = TitleSession::start(
        Arc::new(DocumentTitle::new()),
        bus.events(),
        Arc::new(|| Arc::new(RouteSnapshot::root())),
    )
    .unwrap();
    assert_eq!(bus.subscriber_count(), 1);

    drop(session);
    wait_until(|| bus.subscriber_count() == 0).await;
}

// ============================================================================
// ROUTE TABLE END TO END
// ============================================================================

#[tokio::test]
async fn route_table_drives_the_session() {
    let table = RouteTable::from_yaml(
        r#"
schema: route-title/routes@0.1
default_title: Angular Router Course
routes:
  - path: ""
    title:
      label: Home
  - path: login
  - path: ":courseUrl"
    resolve: [course]
    title:
      label: Course
      template: "{1}"
      resolvers:
        - resolver: course
          itemKey: description
    children:
      - path: "lessons/:lessonSeqNo"
        resolve: [lesson]
        title:
          label: Lesson Detail
          template: "{1}: {3}"
          resolvers:
            - resolver: lesson
              itemKey: description
"#,
    )
    .unwrap();
    table.validate().unwrap();

    let mut resolved = FxHashMap::default();
    resolved.insert("course".to_string(), json!({"description": "Angular Router"}));
    resolved.insert("lesson".to_string(), json!({"description": "Child Routes"}));

    let mut h = Harness::start_with(TitleSession::builder().initial_title("Angular Router Course"));

    h.navigate("/", table.activate("/", &resolved)).await;
    h.navigate("/angular-router", table.activate("/angular-router", &resolved)).await;
    h.navigate("/login", table.activate("/login", &resolved)).await;
    h.navigate(
        "/angular-router/lessons/2",
        table.activate("/angular-router/lessons/2", &resolved),
    )
    .await;

    assert_eq!(
        h.document.history(),
        ["Home", "Angular Router", "Angular Router", "Angular Router: Child Routes"]
    );
}
