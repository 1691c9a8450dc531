//! C-ABI wrapper around `todo-sync`.
//!
//! # Overview
//! Exposes the session and todo operations through `extern "C"` functions
//! so the mobile presentation layer can drive them through any C FFI.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Calls block until the backend answers. Hosts run them off the UI
//!   thread; the handle is safe to share between threads, and
//!   `todo_is_busy` reports whether anything is still in flight.
//! - A single `FfiTodoResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `todo_*_free` / `todo_free_result` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;

use todo_sync::{Config, TodoApp};

use types::*;

/// Copy a caller-owned C string. Invalid UTF-8 is replaced, not rejected.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn read_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

/// Run `f` against the app behind `app`, turning null handles and panics
/// into error results.
fn with_app(
    app: *const FfiTodoApp,
    name: &str,
    f: impl FnOnce(&TodoApp) -> *mut FfiTodoResult,
) -> *mut FfiTodoResult {
    catch_unwind(AssertUnwindSafe(|| {
        if app.is_null() {
            return FfiTodoResult::null_arg("app");
        }
        let app = unsafe { &*app };
        f(&app.inner)
    }))
    .unwrap_or_else(|_| FfiTodoResult::panic(&format!("panic in {name}")))
}

// ---------------------------------------------------------------------------
// App lifecycle
// ---------------------------------------------------------------------------

/// Create an app bound to `base_url`, keeping the session token in
/// `storage_dir`. A null `storage_dir` uses the platform data directory.
///
/// A token left by an earlier run is picked up, so the app may start
/// logged in. Returns null if `base_url` is null, the token cannot be
/// read, or an internal panic occurs. Free with `todo_app_free`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_app_new(
    base_url: *const c_char,
    storage_dir: *const c_char,
) -> *mut FfiTodoApp {
    catch_unwind(|| {
        let Some(base_url) = (unsafe { read_str(base_url) }) else {
            return std::ptr::null_mut();
        };
        let config = Config {
            base_url,
            storage_dir: unsafe { read_str(storage_dir) }.map(PathBuf::from),
        };
        match TodoApp::from_config(&config) {
            Ok(inner) => Box::into_raw(Box::new(FfiTodoApp { inner })),
            Err(e) => {
                tracing::warn!(error = %e, "failed to open todo app");
                std::ptr::null_mut()
            }
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free an app created by `todo_app_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_app_free(app: *mut FfiTodoApp) {
    if !app.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(app) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Register an account. Does not log in.
#[unsafe(no_mangle)]
pub extern "C" fn todo_register(
    app: *const FfiTodoApp,
    username: *const c_char,
    password: *const c_char,
) -> *mut FfiTodoResult {
    with_app(app, "todo_register", |app| {
        let (Some(username), Some(password)) =
            (unsafe { read_str(username) }, unsafe { read_str(password) })
        else {
            return FfiTodoResult::null_arg("username/password");
        };
        match app.session.register(&username, &password) {
            Ok(()) => FfiTodoResult::ok_empty(),
            Err(e) => FfiTodoResult::from_error(&e),
        }
    })
}

/// Log in and persist the session token.
#[unsafe(no_mangle)]
pub extern "C" fn todo_login(
    app: *const FfiTodoApp,
    username: *const c_char,
    password: *const c_char,
) -> *mut FfiTodoResult {
    with_app(app, "todo_login", |app| {
        let (Some(username), Some(password)) =
            (unsafe { read_str(username) }, unsafe { read_str(password) })
        else {
            return FfiTodoResult::null_arg("username/password");
        };
        match app.session.login(&username, &password) {
            Ok(_) => FfiTodoResult::ok_empty(),
            Err(e) => FfiTodoResult::from_error(&e),
        }
    })
}

/// Clear the session token. Safe to call repeatedly.
#[unsafe(no_mangle)]
pub extern "C" fn todo_logout(app: *const FfiTodoApp) -> *mut FfiTodoResult {
    with_app(app, "todo_logout", |app| match app.session.logout() {
        Ok(()) => FfiTodoResult::ok_empty(),
        Err(e) => FfiTodoResult::from_error(&e),
    })
}

/// Whether a session token is held. False for a null handle.
#[unsafe(no_mangle)]
pub extern "C" fn todo_is_logged_in(app: *const FfiTodoApp) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        !app.is_null() && unsafe { &*app }.inner.session.is_logged_in()
    }))
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Todos
// ---------------------------------------------------------------------------

/// Refresh the list from the backend.
///
/// Returns a result with `data_tag = TodoList` on success. On failure the
/// previous list stays in place (see `todo_snapshot`).
#[unsafe(no_mangle)]
pub extern "C" fn todo_fetch_all(app: *const FfiTodoApp) -> *mut FfiTodoResult {
    with_app(app, "todo_fetch_all", |app| match app.todos.fetch_all() {
        Ok(todos) => FfiTodoResult::ok_todo_list(&todos),
        Err(e) => FfiTodoResult::from_error(&e),
    })
}

/// Load one item for a detail view. Returns `data_tag = Todo` on success.
#[unsafe(no_mangle)]
pub extern "C" fn todo_fetch_one(
    app: *const FfiTodoApp,
    id: *const c_char,
) -> *mut FfiTodoResult {
    with_app(app, "todo_fetch_one", |app| {
        let Some(id) = (unsafe { read_str(id) }) else {
            return FfiTodoResult::null_arg("id");
        };
        match app.todos.fetch_one(&id) {
            Ok(todo) => FfiTodoResult::ok_todo(&todo),
            Err(e) => FfiTodoResult::from_error(&e),
        }
    })
}

/// Create an item and refresh the list.
///
/// Empty `title` or `description` fails with `Validation` before any
/// request is sent; a null one fails with `NullArg`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_create(
    app: *const FfiTodoApp,
    title: *const c_char,
    description: *const c_char,
) -> *mut FfiTodoResult {
    with_app(app, "todo_create", |app| {
        let (Some(title), Some(description)) =
            (unsafe { read_str(title) }, unsafe { read_str(description) })
        else {
            return FfiTodoResult::null_arg("title/description");
        };
        match app.todos.create(&title, &description) {
            Ok(()) => FfiTodoResult::ok_empty(),
            Err(e) => FfiTodoResult::from_error(&e),
        }
    })
}

/// Delete an item and refresh the list.
#[unsafe(no_mangle)]
pub extern "C" fn todo_remove(app: *const FfiTodoApp, id: *const c_char) -> *mut FfiTodoResult {
    with_app(app, "todo_remove", |app| {
        let Some(id) = (unsafe { read_str(id) }) else {
            return FfiTodoResult::null_arg("id");
        };
        match app.todos.remove(&id) {
            Ok(()) => FfiTodoResult::ok_empty(),
            Err(e) => FfiTodoResult::from_error(&e),
        }
    })
}

/// Current in-memory list without touching the network.
#[unsafe(no_mangle)]
pub extern "C" fn todo_snapshot(app: *const FfiTodoApp) -> *mut FfiTodoResult {
    with_app(app, "todo_snapshot", |app| {
        FfiTodoResult::ok_todo_list(&app.todos.todos())
    })
}

/// Whether any todo operation is waiting on the network.
#[unsafe(no_mangle)]
pub extern "C" fn todo_is_busy(app: *const FfiTodoApp) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        !app.is_null() && unsafe { &*app }.inner.todos.is_busy()
    }))
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiTodoResult` returned by any function above.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn todo_free_result(result: *mut FfiTodoResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Todo => {
                let todo = unsafe { Box::from_raw(result.data as *mut FfiTodo) };
                free_ffi_todo_fields(&todo);
            }
            FfiDataTag::TodoList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiTodoList) };
                if !list.items.is_null() && list.len > 0 {
                    let items = unsafe {
                        Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                            list.items,
                            list.len as usize,
                        ))
                    };
                    for item in items.iter() {
                        free_ffi_todo_fields(item);
                    }
                }
            }
            FfiDataTag::None => {}
        }
    });
}

/// Free the C-string fields of an `FfiTodo` (but not the struct itself).
fn free_ffi_todo_fields(todo: &FfiTodo) {
    free_c_string(todo.id);
    free_c_string(todo.title);
    free_c_string(todo.description);
}

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Spawn the mock server on a background runtime and return its base URL.
    fn start_server() -> String {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener).await
            })
            .unwrap();
        });

        format!("http://{addr}")
    }

    fn new_app(base_url: &str, dir: &tempfile::TempDir) -> *mut FfiTodoApp {
        let url = CString::new(base_url).unwrap();
        let storage = CString::new(dir.path().to_str().unwrap()).unwrap();
        let app = todo_app_new(url.as_ptr(), storage.as_ptr());
        assert!(!app.is_null());
        app
    }

    fn message(result: &FfiTodoResult) -> String {
        unsafe { CStr::from_ptr(result.error_message) }
            .to_str()
            .unwrap()
            .to_string()
    }

    fn list_titles(result: &FfiTodoResult) -> Vec<String> {
        assert_eq!(result.data_tag, FfiDataTag::TodoList);
        let list = unsafe { &*(result.data as *const FfiTodoList) };
        if list.len == 0 {
            return Vec::new();
        }
        let items = unsafe { std::slice::from_raw_parts(list.items, list.len as usize) };
        items
            .iter()
            .map(|t| unsafe { CStr::from_ptr(t.title) }.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn app_new_and_free() {
        let dir = tempfile::tempdir().unwrap();
        let app = new_app("http://localhost:3000", &dir);
        assert!(!todo_is_logged_in(app));
        assert!(!todo_is_busy(app));
        todo_app_free(app);
    }

    #[test]
    fn app_new_null_url_returns_null() {
        let app = todo_app_new(std::ptr::null(), std::ptr::null());
        assert!(app.is_null());
    }

    #[test]
    fn app_free_null_is_safe() {
        todo_app_free(std::ptr::null_mut());
    }

    #[test]
    fn null_app_returns_null_arg() {
        let result = todo_fetch_all(std::ptr::null());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        assert_eq!(message(r), "null argument: app");
        todo_free_result(result);

        assert!(!todo_is_logged_in(std::ptr::null()));
        assert!(!todo_is_busy(std::ptr::null()));
    }

    #[test]
    fn null_id_returns_null_arg() {
        let dir = tempfile::tempdir().unwrap();
        let app = new_app("http://localhost:3000", &dir);

        let result = todo_remove(app, std::ptr::null());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);

        todo_free_result(result);
        todo_app_free(app);
    }

    #[test]
    fn create_with_empty_title_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        // Nothing listens here; a validation failure must not need the network.
        let app = new_app("http://127.0.0.1:1", &dir);
        let title = CString::new("").unwrap();
        let description = CString::new("x").unwrap();

        let result = todo_create(app, title.as_ptr(), description.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Validation);
        assert_eq!(message(r), "Both title and description are required.");
        assert_eq!(r.http_status, 0);
        assert!(r.data.is_null());

        todo_free_result(result);
        todo_app_free(app);
    }

    #[test]
    fn create_with_null_fields_returns_null_arg() {
        let dir = tempfile::tempdir().unwrap();
        let app = new_app("http://127.0.0.1:1", &dir);
        let title = CString::new("Buy milk").unwrap();

        for result in [
            todo_create(app, title.as_ptr(), std::ptr::null()),
            todo_create(app, std::ptr::null(), title.as_ptr()),
        ] {
            let r = unsafe { &*result };
            assert_eq!(r.error_code, FfiErrorCode::NullArg);
            assert_eq!(message(r), "null argument: title/description");
            todo_free_result(result);
        }
        todo_app_free(app);
    }

    #[test]
    fn unreachable_backend_is_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = new_app("http://127.0.0.1:1", &dir);

        let result = todo_fetch_all(app);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Transport);
        assert_eq!(message(r), "Failed to fetch todos");

        todo_free_result(result);
        todo_app_free(app);
    }

    #[test]
    fn snapshot_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let app = new_app("http://localhost:3000", &dir);

        let result = todo_snapshot(app);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert!(list_titles(r).is_empty());

        todo_free_result(result);
        todo_app_free(app);
    }

    #[test]
    fn full_session_against_mock_server() {
        let base_url = start_server();
        let dir = tempfile::tempdir().unwrap();
        let app = new_app(&base_url, &dir);
        let user = CString::new("alice").unwrap();
        let pass = CString::new("secret").unwrap();

        let result = todo_fetch_all(app);
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::Authentication);
        assert_eq!(unsafe { &*result }.http_status, 401);
        todo_free_result(result);

        for step in [
            todo_register(app, user.as_ptr(), pass.as_ptr()),
            todo_login(app, user.as_ptr(), pass.as_ptr()),
        ] {
            assert_eq!(unsafe { &*step }.error_code, FfiErrorCode::Ok);
            todo_free_result(step);
        }
        assert!(todo_is_logged_in(app));

        let title = CString::new("Buy milk").unwrap();
        let description = CString::new("2%").unwrap();
        let result = todo_create(app, title.as_ptr(), description.as_ptr());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::Ok);
        todo_free_result(result);

        let result = todo_snapshot(app);
        assert_eq!(list_titles(unsafe { &*result }), ["Buy milk"]);
        let id = {
            let list = unsafe { &*((*result).data as *const FfiTodoList) };
            let first = unsafe { &*list.items };
            unsafe { CStr::from_ptr(first.id) }.to_owned()
        };
        todo_free_result(result);

        let result = todo_fetch_one(app, id.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.data_tag, FfiDataTag::Todo);
        let todo = unsafe { &*(r.data as *const FfiTodo) };
        assert_eq!(
            unsafe { CStr::from_ptr(todo.description) }.to_str().unwrap(),
            "2%"
        );
        todo_free_result(result);

        let result = todo_remove(app, id.as_ptr());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::Ok);
        todo_free_result(result);

        let result = todo_fetch_all(app);
        assert!(list_titles(unsafe { &*result }).is_empty());
        todo_free_result(result);

        let result = todo_remove(app, id.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Server);
        assert_eq!(r.http_status, 404);
        assert_eq!(message(r), "Failed to delete todo");
        todo_free_result(result);

        let result = todo_logout(app);
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::Ok);
        todo_free_result(result);
        assert!(!todo_is_logged_in(app));

        todo_app_free(app);
    }

    #[test]
    fn free_result_null_is_safe() {
        todo_free_result(std::ptr::null_mut());
    }
}
