//! End-to-end move scenarios across window boundaries.
//!
//! These tests drive `put` and `remove` through a session with several
//! live windows and assert on the full event traffic: which window
//! spoke, in what order, and with which payloads.

use std::cell::RefCell;
use std::rc::Rc;

use arbor_sync::{
    EventKind, EventSubscription, Identifier, IdentityRequest, ListEvent, PutOptions, SyncSession,
    ViewWindow,
};
use arbor_tree::{Node, NodeRef, Tree};

type EventLog = Rc<RefCell<Vec<(&'static str, ListEvent)>>>;

fn record(
    log: &EventLog,
    name: &'static str,
    window: &ViewWindow<&'static str>,
) -> EventSubscription {
    let sink = log.clone();
    window
        .events()
        .subscribe(move |event| sink.borrow_mut().push((name, event.clone())))
}

fn values(session: &SyncSession<&'static str>, parent: NodeRef) -> Vec<&'static str> {
    let tree = session.tree();
    tree.children(parent)
        .unwrap()
        .iter()
        .map(|&node| *tree.value(node).unwrap())
        .collect()
}

/// root
/// ├── docs{id:10}
/// │   ├── intro{id:11}
/// │   └── guide{id:12}
/// └── misc{id:20}  (declared, empty)
fn two_folder_session() -> SyncSession<&'static str> {
    SyncSession::new(Tree::new(
        Node::new("root")
            .child(
                Node::new("docs")
                    .with_identity(10)
                    .child(Node::new("intro").with_identity(11))
                    .child(Node::new("guide").with_identity(12)),
            )
            .child(Node::new("misc").with_identity(20).with_children(Vec::new())),
    ))
    .unwrap()
}

#[test]
fn cross_parent_move_emits_delete_then_add() {
    let session = two_folder_session();
    let root = session.tree().root();
    let (docs, misc) = {
        let children = session.tree().children(root).unwrap().to_vec();
        (children[0], children[1])
    };
    let intro = session.tree().children(docs).unwrap()[0];

    let docs_window = session.window_for(docs).unwrap();
    let misc_window = session.window_for(misc).unwrap();

    let log: EventLog = Rc::new(RefCell::new(Vec::new()));
    let _root_sub = record(&log, "root", session.root_window());
    let _docs_sub = record(&log, "docs", &docs_window);
    let _misc_sub = record(&log, "misc", &misc_window);

    // Drop intro onto the misc folder.
    session.resolve(IdentityRequest::Bare(misc)).unwrap();
    session
        .root_window()
        .put(intro, PutOptions::after("20"))
        .unwrap();

    assert_eq!(values(&session, docs), vec!["guide"]);
    assert_eq!(values(&session, misc), vec!["intro"]);

    let log = log.borrow();
    assert_eq!(log.len(), 2, "exactly one delete and one add");
    assert_eq!(log[0].0, "docs");
    assert_eq!(log[0].1.kind, EventKind::Delete);
    assert_eq!(log[0].1.id.as_ref().map(Identifier::as_str), Some("11"));
    assert_eq!(log[1].0, "misc");
    assert_eq!(log[1].1.kind, EventKind::Add);
    assert_eq!(log[1].1.before_id, None);
    assert_eq!(log[1].1.target, intro);
}

#[test]
fn move_into_sibling_before_target() {
    let session = two_folder_session();
    let root = session.tree().root();
    let docs = session.tree().children(root).unwrap()[0];
    let guide = session.tree().children(docs).unwrap()[1];
    let misc = session.tree().children(root).unwrap()[1];

    // Move misc into docs, before guide.
    session.resolve(IdentityRequest::Bare(guide)).unwrap();
    let docs_window = session.window_for(docs).unwrap();

    let log: EventLog = Rc::new(RefCell::new(Vec::new()));
    let _root_sub = record(&log, "root", session.root_window());
    let _docs_sub = record(&log, "docs", &docs_window);

    session
        .root_window()
        .put(misc, PutOptions::before("12"))
        .unwrap();

    assert_eq!(values(&session, root), vec!["docs"]);
    assert_eq!(values(&session, docs), vec!["intro", "misc", "guide"]);

    let log = log.borrow();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].0, "root");
    assert_eq!(log[0].1.kind, EventKind::Delete);
    assert_eq!(log[0].1.id.as_ref().map(Identifier::as_str), Some("20"));
    assert_eq!(log[1].0, "docs");
    assert_eq!(log[1].1.kind, EventKind::Add);
    assert_eq!(
        log[1].1.before_id.as_ref().map(Identifier::as_str),
        Some("12")
    );
}

#[test]
fn windows_with_synthetic_ids_still_receive_events_after_shifts() {
    // No explicit identities: every identifier is path-derived, so moves
    // shift identifiers and the registry must follow.
    let session = SyncSession::new(Tree::new(
        Node::new("root")
            .child(Node::new("first").with_children(vec![Node::new("x")]))
            .child(Node::new("second").with_children(vec![Node::new("y")])),
    ))
    .unwrap();
    let root = session.tree().root();
    let (first, second) = {
        let children = session.tree().children(root).unwrap().to_vec();
        (children[0], children[1])
    };
    let x = session.tree().children(first).unwrap()[0];

    let first_window = session.window_for(first).unwrap();
    let second_window = session.window_for(second).unwrap();

    // Move first to the end: [second, first]. Both folders' synthetic
    // identifiers swap.
    session.root_window().put(first, PutOptions::end()).unwrap();
    assert_eq!(values(&session, root), vec!["second", "first"]);

    let log: EventLog = Rc::new(RefCell::new(Vec::new()));
    let _first_sub = record(&log, "first", &first_window);
    let _second_sub = record(&log, "second", &second_window);

    // Now move x from first into second. The delete must reach the
    // re-keyed first window, the add the re-keyed second window.
    let y = session.tree().children(second).unwrap()[0];
    let y_id = session.resolve(IdentityRequest::Bare(y)).unwrap();
    session
        .root_window()
        .put(x, PutOptions::before(y_id.as_str()))
        .unwrap();

    assert_eq!(values(&session, first), Vec::<&str>::new());
    assert_eq!(values(&session, second), vec!["x", "y"]);

    let log = log.borrow();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].0, "first");
    assert_eq!(log[0].1.kind, EventKind::Delete);
    assert_eq!(log[1].0, "second");
    assert_eq!(log[1].1.kind, EventKind::Add);
}

#[test]
fn remove_decrements_only_the_owning_window() {
    let session = two_folder_session();
    let root = session.tree().root();
    let docs = session.tree().children(root).unwrap()[0];
    let guide = session.tree().children(docs).unwrap()[1];

    let docs_window = session.window_for(docs).unwrap();
    assert_eq!(docs_window.fetch_all().total, 2);
    assert_eq!(session.root_window().fetch_all().total, 2);

    let id = session.resolve(IdentityRequest::Bare(guide)).unwrap();
    assert_eq!(docs_window.remove(id.as_str()), Ok(true));

    assert_eq!(docs_window.fetch_all().total, 1);
    assert_eq!(session.root_window().fetch_all().total, 2);
    assert!(!session.tree().contains(guide));
}

#[test]
fn fetch_range_pages_against_full_total() {
    let session = SyncSession::new(Tree::new(Node::new("root").with_children(
        (0..7).map(|i| Node::new("n").with_identity(i)).collect(),
    )))
    .unwrap();
    let window = session.root_window();

    let page = window.fetch_range(2, 5);
    assert_eq!(page.len(), 3);
    assert_eq!(page.total, 7);

    let children: Vec<NodeRef> = session
        .tree()
        .children(session.tree().root())
        .unwrap()
        .to_vec();
    assert_eq!(page.items, children[2..5]);
}

#[test]
fn chained_moves_keep_identifiers_and_events_consistent() {
    let session = two_folder_session();
    let root = session.tree().root();
    let (docs, misc) = {
        let children = session.tree().children(root).unwrap().to_vec();
        (children[0], children[1])
    };
    let (intro, guide) = {
        let children = session.tree().children(docs).unwrap().to_vec();
        (children[0], children[1])
    };

    // docs/intro -> misc (drop on folder), then back before guide.
    session.resolve(IdentityRequest::Bare(misc)).unwrap();
    session.resolve(IdentityRequest::Bare(guide)).unwrap();
    session
        .root_window()
        .put(intro, PutOptions::after("20"))
        .unwrap();
    assert_eq!(values(&session, misc), vec!["intro"]);

    session
        .root_window()
        .put(intro, PutOptions::before("12"))
        .unwrap();
    assert_eq!(values(&session, docs), vec!["intro", "guide"]);
    assert_eq!(values(&session, misc), Vec::<&str>::new());

    // The item's identifier is explicit and stayed stable throughout.
    assert_eq!(
        session.resolve(IdentityRequest::Bare(intro)).unwrap(),
        "11"
    );
}
