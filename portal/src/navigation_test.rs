use super::*;
use std::sync::atomic::AtomicUsize;

fn always(result: Result<bool, ClientError>) -> GuardPredicate {
    let result = Arc::new(Mutex::new(Some(result)));
    Arc::new(move || -> GuardFuture {
        let next = result
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Ok(true));
        Box::pin(async move { next })
    })
}

#[derive(Default)]
struct RecordingSaver {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait::async_trait]
impl DraftSaver<String> for RecordingSaver {
    async fn save(&self, draft: &String) -> Result<String, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ClientError::Status { status: 500, body: "down".into() });
        }
        Ok(format!("{draft} (saved)"))
    }
}

// =============================================================================
// guard
// =============================================================================

#[tokio::test]
async fn navigation_allowed_without_guard() {
    let guard = NavigationGuard::new();
    let nav = HistoryNavigator::new();
    assert!(guard.navigate(&nav, "/lists").await);
    assert_eq!(nav.current().as_deref(), Some("/lists"));
}

#[tokio::test]
async fn predicate_false_blocks_navigation() {
    let guard = NavigationGuard::new();
    let nav = HistoryNavigator::new();
    let _handle = guard.register(always(Ok(false)));
    assert!(!guard.navigate(&nav, "/lists").await);
    assert!(nav.visited().is_empty());
}

#[tokio::test]
async fn predicate_error_blocks_navigation() {
    let guard = NavigationGuard::new();
    let nav = HistoryNavigator::new();
    let _handle = guard.register(always(Err(ClientError::NotLoggedIn)));
    assert!(!guard.navigate(&nav, "/lists").await);
}

#[tokio::test]
async fn dropping_handle_uninstalls_guard() {
    let guard = NavigationGuard::new();
    let handle = guard.register(always(Ok(false)));
    assert!(guard.is_armed());
    drop(handle);
    assert!(!guard.is_armed());
    assert!(guard.can_navigate().await);
}

#[test]
fn stale_handle_does_not_remove_newer_guard() {
    let guard = NavigationGuard::new();
    let first = guard.register(always(Ok(true)));
    let _second = guard.register(always(Ok(false)));
    drop(first);
    assert!(guard.is_armed());
}

#[test]
fn clear_removes_installed_guard() {
    let guard = NavigationGuard::new();
    let _handle = guard.register(always(Ok(false)));
    guard.clear();
    assert!(!guard.is_armed());
}

// =============================================================================
// editor session
// =============================================================================

#[tokio::test]
async fn first_edit_arms_guard() {
    let guard = NavigationGuard::new();
    let saver = Arc::new(RecordingSaver::default());
    let editor = EditorSession::new("draft".to_owned(), saver, Arc::clone(&guard));

    assert!(!guard.is_armed());
    editor.edit(|d| d.push('!')).await;
    assert!(guard.is_armed());
    assert!(editor.is_dirty().await);
}

#[tokio::test]
async fn leaving_dirty_editor_auto_saves() {
    let guard = NavigationGuard::new();
    let saver = Arc::new(RecordingSaver::default());
    let editor = EditorSession::new("seg".to_owned(), saver.clone(), Arc::clone(&guard));
    let nav = HistoryNavigator::new();

    editor.edit(|d| d.push_str(" v2")).await;
    assert!(guard.navigate(&nav, "/segments").await);
    assert_eq!(saver.calls.load(Ordering::SeqCst), 1);
    assert!(!editor.is_dirty().await);
    assert_eq!(editor.draft().await, "seg v2 (saved)");
}

#[tokio::test]
async fn failed_auto_save_blocks_navigation_and_stays_dirty() {
    let guard = NavigationGuard::new();
    let saver = Arc::new(RecordingSaver { fail: true, ..RecordingSaver::default() });
    let editor = EditorSession::new("seg".to_owned(), saver, Arc::clone(&guard));
    let nav = HistoryNavigator::new();

    editor.edit(|d| d.push('x')).await;
    assert!(!guard.navigate(&nav, "/segments").await);
    assert!(nav.visited().is_empty());
    assert!(editor.is_dirty().await);
}

#[tokio::test]
async fn explicit_save_disarms_guard() {
    let guard = NavigationGuard::new();
    let saver = Arc::new(RecordingSaver::default());
    let editor = EditorSession::new("seg".to_owned(), saver, Arc::clone(&guard));

    editor.edit(|d| d.push('x')).await;
    let saved = editor.save().await.unwrap();
    assert_eq!(saved, "segx (saved)");
    assert!(!guard.is_armed());
    assert!(!editor.is_dirty().await);
}

#[tokio::test]
async fn clean_editor_navigates_without_saving() {
    let guard = NavigationGuard::new();
    let saver = Arc::new(RecordingSaver::default());
    let editor = EditorSession::new("seg".to_owned(), saver.clone(), Arc::clone(&guard));
    let nav = HistoryNavigator::new();

    editor.edit(|d| d.push('x')).await;
    editor.save().await.unwrap();
    editor.edit(|d| {
        d.pop();
    }).await;
    editor.save().await.unwrap();

    assert!(guard.navigate(&nav, "/home").await);
    assert_eq!(saver.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn dropping_editor_disarms_guard() {
    let guard = NavigationGuard::new();
    let saver = Arc::new(RecordingSaver::default());
    let editor = EditorSession::new("seg".to_owned(), saver, Arc::clone(&guard));
    editor.edit(|d| d.push('x')).await;
    drop(editor);
    assert!(!guard.is_armed());
}
