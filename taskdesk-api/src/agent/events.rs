//! Notifications and navigation requests for the user interface.
use taskdesk_rest::{Error, ErrorClass};
use tokio::sync::broadcast;

const CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Home,
    NotFound,
    ServerError { message: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Notification(Notification),
    Navigate(Route),
}

/// A broadcast channel of [`Event`]s. Clones share the channel.
///
/// Emitting never fails: events sent while nobody is subscribed are dropped.
#[derive(Debug, Clone)]
pub struct Events {
    tx: broadcast::Sender<Event>,
}

impl Default for Events {
    fn default() -> Self {
        let (tx, _) = broadcast::channel(CAPACITY);
        Self { tx }
    }
}

impl Events {
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
    pub fn emit(&self, event: Event) {
        let _ = self.tx.send(event);
    }
    pub fn success(&self, message: impl Into<String>) {
        self.notify(NotificationKind::Success, "Success", message.into());
    }
    pub fn error(&self, message: impl Into<String>) {
        self.notify(NotificationKind::Error, "Error", message.into());
    }
    pub fn navigate(&self, route: Route) {
        self.emit(Event::Navigate(route));
    }
    /// Surfaces a failed request according to its class.
    ///
    /// Validation failures that carry field errors are left to the caller,
    /// which shows them next to the offending inputs.
    pub fn report(&self, err: &Error) {
        match err.class() {
            ErrorClass::Validation => {
                if err.validation_messages().is_empty() {
                    self.error(err.message().unwrap_or("Bad Request"));
                }
            }
            ErrorClass::Unauthorized => self.error("Unauthorized access. Please log in."),
            ErrorClass::NotFound => self.navigate(Route::NotFound),
            ErrorClass::Server => {
                self.navigate(Route::ServerError { message: err.message().map(String::from) })
            }
            ErrorClass::Other => self.error(err.message().unwrap_or("An unexpected error occurred.")),
        }
    }
    fn notify(&self, kind: NotificationKind, title: &str, message: String) {
        self.emit(Event::Notification(Notification { kind, title: title.into(), message }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use taskdesk_rest::error::{ErrorResponseBody, RestError};

    fn rest_error(status: StatusCode, body: Option<ErrorResponseBody>) -> Error {
        Error::RestResponse(RestError { status, error: body })
    }

    fn reported(err: Error) -> Vec<Event> {
        let events = Events::default();
        let mut rx = events.subscribe();
        events.report(&err);
        let mut received = Vec::new();
        while let Ok(event) = rx.try_recv() {
            received.push(event);
        }
        received
    }

    fn error_notification(message: &str) -> Event {
        Event::Notification(Notification {
            kind: NotificationKind::Error,
            title: String::from("Error"),
            message: String::from(message),
        })
    }

    #[test]
    fn report_by_class() {
        let with_message = |message: &str| {
            Some(ErrorResponseBody { message: Some(message.into()), ..Default::default() })
        };
        assert_eq!(
            reported(rest_error(StatusCode::BAD_REQUEST, None)),
            vec![error_notification("Bad Request")]
        );
        assert_eq!(
            reported(rest_error(StatusCode::BAD_REQUEST, with_message("Email already taken"))),
            vec![error_notification("Email already taken")]
        );
        assert_eq!(
            reported(rest_error(StatusCode::UNAUTHORIZED, with_message("expired"))),
            vec![error_notification("Unauthorized access. Please log in.")]
        );
        assert_eq!(
            reported(rest_error(StatusCode::NOT_FOUND, None)),
            vec![Event::Navigate(Route::NotFound)]
        );
        assert_eq!(
            reported(rest_error(StatusCode::INTERNAL_SERVER_ERROR, with_message("db down"))),
            vec![Event::Navigate(Route::ServerError { message: Some(String::from("db down")) })]
        );
        assert_eq!(
            reported(rest_error(StatusCode::FORBIDDEN, None)),
            vec![error_notification("An unexpected error occurred.")]
        );
        assert_eq!(
            reported(Error::UnexpectedResponseType),
            vec![error_notification("An unexpected error occurred.")]
        );
    }

    #[test]
    fn field_errors_are_left_to_the_caller() {
        let body = ErrorResponseBody {
            title: Some(String::from("One or more validation errors occurred.")),
            errors: Some([(String::from("Title"), vec![String::from("Required.")])].into()),
            ..Default::default()
        };
        assert!(reported(rest_error(StatusCode::BAD_REQUEST, Some(body))).is_empty());
    }

    #[test]
    fn emit_without_subscribers() {
        let events = Events::default();
        events.success("nobody listens");
        let mut rx = events.clone().subscribe();
        events.navigate(Route::Home);
        assert_eq!(rx.try_recv().ok(), Some(Event::Navigate(Route::Home)));
    }
}
