//! Connection state machine.
//!
//! [`ConnectionManager`] owns the only socket handle. The handle lives inside
//! the state enum, so "connected" and "has a socket" cannot disagree, and
//! callers never see the handle itself.

mod observer;
#[cfg(test)]
pub(crate) mod testing;
mod transport;

pub use observer::{ConnectionObserver, TracingObserver};
pub use transport::{Socket, SocketEvent, SocketId, SocketSignal, Transport};

#[cfg(test)]
pub use observer::MockConnectionObserver;

use roomtap_shared::time::{Clock, SystemClock};

use crate::{
    codec::{self, Frame},
    domain::{ConnectionState, Direction, Transcript},
};

/// Connection state together with the socket that belongs to it
enum Link<S> {
    Disconnected,
    Connecting(S),
    Connected(S),
}

impl<S: Socket> Link<S> {
    fn state(&self) -> ConnectionState {
        match self {
            Self::Disconnected => ConnectionState::Disconnected,
            Self::Connecting(_) => ConnectionState::Connecting,
            Self::Connected(_) => ConnectionState::Connected,
        }
    }

    fn socket_id(&self) -> Option<SocketId> {
        match self {
            Self::Disconnected => None,
            Self::Connecting(socket) | Self::Connected(socket) => Some(socket.id()),
        }
    }
}

/// Owns the socket, tracks its state and records the transcript
pub struct ConnectionManager<T: Transport> {
    endpoint: String,
    transport: T,
    link: Link<T::Socket>,
    /// Set by `disconnect` until the close signal arrives
    closing: bool,
    transcript: Transcript,
    observers: Vec<Box<dyn ConnectionObserver>>,
    clock: Box<dyn Clock>,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(endpoint: impl Into<String>, transport: T) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
            link: Link::Disconnected,
            closing: false,
            transcript: Transcript::new(),
            observers: Vec::new(),
            clock: Box::new(SystemClock),
        }
    }

    /// Replace the clock used to timestamp transcript entries
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn ConnectionObserver>) {
        self.observers.push(observer);
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> ConnectionState {
        self.link.state()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn clear_transcript(&mut self) {
        self.transcript.clear();
    }

    /// Append a system entry that is not tied to a socket signal
    pub fn report(&mut self, text: impl Into<String>) {
        let at = self.clock.now_millis();
        self.transcript.push(Direction::System, text, at);
    }

    /// Open a socket to the endpoint.
    ///
    /// Only valid while disconnected; otherwise nothing happens and `false`
    /// is returned.
    pub fn connect(&mut self) -> bool {
        if !self.link.state().is_disconnected() {
            tracing::debug!("connect() ignored while {}", self.link.state());
            return false;
        }

        tracing::info!("Opening socket to {}", self.endpoint);
        let socket = self.transport.open(&self.endpoint);
        self.link = Link::Connecting(socket);
        self.closing = false;
        true
    }

    /// Request the socket to close.
    ///
    /// The state changes when the close signal arrives, not here. Sends are
    /// refused from this point on.
    pub fn disconnect(&mut self) -> bool {
        match &mut self.link {
            Link::Connecting(socket) | Link::Connected(socket) => {
                if self.closing {
                    tracing::debug!("Socket {} is already closing", socket.id());
                } else {
                    tracing::info!("Closing socket {}", socket.id());
                    socket.close();
                    self.closing = true;
                }
                true
            }
            Link::Disconnected => {
                tracing::debug!("disconnect() ignored while disconnected");
                false
            }
        }
    }

    /// Transmit a frame if connected.
    ///
    /// The outbound transcript entry is appended before the frame is handed
    /// to the socket. Returns `false`, with no transport call, when not
    /// connected. A send after `disconnect` also returns `false` and leaves
    /// an error entry, since the socket no longer transmits.
    pub fn send(&mut self, frame: &Frame) -> bool {
        let Link::Connected(socket) = &mut self.link else {
            tracing::debug!("send() ignored while {}", self.link.state());
            return false;
        };

        let at = self.clock.now_millis();
        if self.closing {
            tracing::debug!("Socket {} is closing, frame not sent", socket.id());
            self.transcript
                .push(Direction::System, "Error: socket closing, frame not sent", at);
            return false;
        }

        self.transcript.push(Direction::Outbound, frame.as_str(), at);
        socket.send(frame.as_str());
        true
    }

    /// Apply one lifecycle signal from the transport
    pub fn handle_event(&mut self, event: SocketEvent) {
        let SocketEvent { socket, signal } = event;
        if self.link.socket_id() != Some(socket) {
            tracing::debug!("Ignoring {:?} from stale socket {}", signal, socket);
            return;
        }

        let at = self.clock.now_millis();
        match signal {
            SocketSignal::Open => {
                match std::mem::replace(&mut self.link, Link::Disconnected) {
                    Link::Connecting(socket) => self.link = Link::Connected(socket),
                    other => {
                        tracing::warn!("Unexpected open signal while {}", other.state());
                        self.link = other;
                        return;
                    }
                }
                self.transcript
                    .push(Direction::System, "Connection established", at);
                self.observers.iter_mut().for_each(|o| o.on_open());
            }
            SocketSignal::Error(detail) => {
                self.transcript
                    .push(Direction::System, format!("Error: {detail}"), at);
                self.observers.iter_mut().for_each(|o| o.on_error(&detail));
            }
            SocketSignal::Close(code) => {
                self.link = Link::Disconnected;
                self.closing = false;
                self.transcript
                    .push(Direction::System, format!("Connection closed: {code}"), at);
                self.observers.iter_mut().for_each(|o| o.on_close(code));
            }
            SocketSignal::Message(text) => {
                if !self.link.state().is_connected() {
                    tracing::debug!("Dropping message received while {}", self.link.state());
                    return;
                }
                let event = codec::decode(&text);
                self.transcript.push(Direction::Inbound, event.text, at);
                self.observers.iter_mut().for_each(|o| o.on_message(&text));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{RecordingTransport, frame};
    use super::*;
    use roomtap_shared::time::FixedClock;

    const ENDPOINT: &str = "ws://localhost:9080/rooms/ws/RecRoom";

    fn create_test_manager() -> (ConnectionManager<RecordingTransport>, RecordingTransport) {
        let transport = RecordingTransport::default();
        let manager =
            ConnectionManager::new(ENDPOINT, transport.clone()).with_clock(FixedClock::new(1000));
        (manager, transport)
    }

    fn open(manager: &mut ConnectionManager<RecordingTransport>, transport: &RecordingTransport) {
        manager.connect();
        manager.handle_event(SocketEvent::new(transport.last_id(), SocketSignal::Open));
    }

    #[test]
    fn test_connect_moves_to_connecting() {
        // テスト項目: connect で Connecting に遷移し、ソケットが 1 つ開かれる
        // given (前提条件):
        let (mut manager, transport) = create_test_manager();

        // when (操作):
        let started = manager.connect();

        // then (期待する結果):
        assert!(started);
        assert_eq!(manager.state(), ConnectionState::Connecting);
        assert_eq!(transport.opened(), vec![ENDPOINT.to_string()]);
    }

    #[test]
    fn test_connect_is_idempotent_while_not_disconnected() {
        // テスト項目: Connecting / Connected 中の connect は何度呼んでもソケットを追加で開かない
        // given (前提条件):
        let (mut manager, transport) = create_test_manager();
        manager.connect();

        // when (操作):
        let while_connecting = manager.connect();
        manager.handle_event(SocketEvent::new(transport.last_id(), SocketSignal::Open));
        let while_connected = manager.connect();
        manager.connect();

        // then (期待する結果):
        assert!(!while_connecting);
        assert!(!while_connected);
        assert_eq!(transport.opened().len(), 1);
        assert_eq!(manager.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_open_signal_connects_and_records() {
        // テスト項目: open シグナルで Connected に遷移し、システムエントリが追加される
        // given (前提条件):
        let (mut manager, transport) = create_test_manager();
        manager.connect();

        // when (操作):
        manager.handle_event(SocketEvent::new(transport.last_id(), SocketSignal::Open));

        // then (期待する結果):
        assert_eq!(manager.state(), ConnectionState::Connected);
        let last = manager.transcript().last().unwrap();
        assert_eq!(last.direction, Direction::System);
        assert_eq!(last.text, "Connection established");
        assert_eq!(last.at, 1000);
    }

    #[test]
    fn test_error_signal_keeps_state() {
        // テスト項目: error シグナル単体では状態は変わらず、詳細がエントリに残る
        // given (前提条件):
        let (mut manager, transport) = create_test_manager();
        manager.connect();

        // when (操作):
        manager.handle_event(SocketEvent::new(
            transport.last_id(),
            SocketSignal::Error("connection refused".to_string()),
        ));

        // then (期待する結果):
        assert_eq!(manager.state(), ConnectionState::Connecting);
        assert_eq!(
            manager.transcript().last().unwrap().text,
            "Error: connection refused"
        );
    }

    #[test]
    fn test_disconnect_then_close_from_connected() {
        // テスト項目: Connected から disconnect → close シグナルで Disconnected になる
        // given (前提条件):
        let (mut manager, transport) = create_test_manager();
        open(&mut manager, &transport);

        // when (操作):
        let requested = manager.disconnect();
        let state_before_close = manager.state();
        manager.handle_event(SocketEvent::new(transport.last_id(), SocketSignal::Close(1000)));

        // then (期待する結果):
        assert!(requested);
        assert_eq!(state_before_close, ConnectionState::Connected);
        assert_eq!(transport.closes(), 1);
        assert_eq!(manager.state(), ConnectionState::Disconnected);
        assert_eq!(
            manager.transcript().last().unwrap().text,
            "Connection closed: 1000"
        );
    }

    #[test]
    fn test_send_after_disconnect_request_is_refused() {
        // テスト項目: disconnect 要求後、close シグナル前の send は送信されずエラーエントリが残る
        // given (前提条件):
        let (mut manager, transport) = create_test_manager();
        open(&mut manager, &transport);
        manager.disconnect();

        // when (操作):
        let sent = manager.send(&frame("roomHello,r1,{}"));

        // then (期待する結果):
        assert!(!sent);
        assert_eq!(manager.state(), ConnectionState::Connected);
        assert!(transport.sent().is_empty());
        let last = manager.transcript().last().unwrap();
        assert_eq!(last.direction, Direction::System);
        assert_eq!(last.text, "Error: socket closing, frame not sent");
    }

    #[test]
    fn test_repeated_disconnect_closes_once() {
        // テスト項目: close 待ちの間に disconnect を繰り返してもクローズ要求は 1 回だけ
        // given (前提条件):
        let (mut manager, transport) = create_test_manager();
        open(&mut manager, &transport);

        // when (操作):
        let first = manager.disconnect();
        let second = manager.disconnect();

        // then (期待する結果):
        assert!(first);
        assert!(second);
        assert_eq!(transport.closes(), 1);
    }

    #[test]
    fn test_send_allowed_again_after_reconnect() {
        // テスト項目: クローズ後に再接続すれば送信できる
        // given (前提条件):
        let (mut manager, transport) = create_test_manager();
        open(&mut manager, &transport);
        manager.disconnect();
        manager.handle_event(SocketEvent::new(transport.last_id(), SocketSignal::Close(1000)));
        open(&mut manager, &transport);

        // when (操作):
        let sent = manager.send(&frame("roomJoin,r1,{}"));

        // then (期待する結果):
        assert!(sent);
        assert_eq!(transport.sent(), vec!["roomJoin,r1,{}".to_string()]);
    }

    #[test]
    fn test_disconnect_then_close_from_connecting() {
        // テスト項目: Connecting 中の disconnect も許容され、close シグナルで Disconnected になる
        // given (前提条件):
        let (mut manager, transport) = create_test_manager();
        manager.connect();

        // when (操作):
        let requested = manager.disconnect();
        manager.handle_event(SocketEvent::new(transport.last_id(), SocketSignal::Close(1006)));

        // then (期待する結果):
        assert!(requested);
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_disconnect_while_disconnected_is_noop() {
        // テスト項目: 未接続での disconnect は何もしない
        // given (前提条件):
        let (mut manager, transport) = create_test_manager();

        // when (操作):
        let requested = manager.disconnect();

        // then (期待する結果):
        assert!(!requested);
        assert_eq!(transport.closes(), 0);
        assert!(manager.transcript().is_empty());
    }

    #[test]
    fn test_reconnect_after_close() {
        // テスト項目: close 後は再び connect できる (状態機械は再入可能)
        // given (前提条件):
        let (mut manager, transport) = create_test_manager();
        open(&mut manager, &transport);
        manager.handle_event(SocketEvent::new(transport.last_id(), SocketSignal::Close(1001)));

        // when (操作):
        let started = manager.connect();

        // then (期待する結果):
        assert!(started);
        assert_eq!(transport.opened().len(), 2);
        assert_eq!(manager.state(), ConnectionState::Connecting);
    }

    #[test]
    fn test_send_while_disconnected_is_noop() {
        // テスト項目: 未接続での send はトランスポートを呼ばず、パニックもしない
        // given (前提条件):
        let (mut manager, transport) = create_test_manager();

        // when (操作):
        let sent = manager.send(&frame("room,r1,{}"));

        // then (期待する結果):
        assert!(!sent);
        assert!(transport.sent().is_empty());
        assert!(manager.transcript().is_empty());
    }

    #[test]
    fn test_send_while_connecting_is_noop() {
        // テスト項目: Connecting 中の send も送信されない
        // given (前提条件):
        let (mut manager, transport) = create_test_manager();
        manager.connect();

        // when (操作):
        let sent = manager.send(&frame("room,r1,{}"));

        // then (期待する結果):
        assert!(!sent);
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_send_records_outbound_then_transmits() {
        // テスト項目: 接続中の send は送信エントリを追加してからフレームを送る
        // given (前提条件):
        let (mut manager, transport) = create_test_manager();
        open(&mut manager, &transport);

        // when (操作):
        let sent = manager.send(&frame("roomJoin,r1,{}"));

        // then (期待する結果):
        assert!(sent);
        assert_eq!(transport.sent(), vec!["roomJoin,r1,{}".to_string()]);
        let last = manager.transcript().last().unwrap();
        assert_eq!(last.direction, Direction::Outbound);
        assert_eq!(last.text, "roomJoin,r1,{}");
    }

    #[test]
    fn test_send_after_close_is_noop() {
        // テスト項目: close 後の send は送信されない
        // given (前提条件):
        let (mut manager, transport) = create_test_manager();
        open(&mut manager, &transport);
        manager.handle_event(SocketEvent::new(transport.last_id(), SocketSignal::Close(1000)));

        // when (操作):
        let sent = manager.send(&frame("room,r1,{}"));

        // then (期待する結果):
        assert!(!sent);
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_inbound_message_is_recorded_verbatim() {
        // テスト項目: 受信メッセージはそのまま受信エントリとして記録される
        // given (前提条件):
        let (mut manager, transport) = create_test_manager();
        open(&mut manager, &transport);
        let text = r#"player,*,{"type":"chat","username":"bob","content":"hi, all"}"#;

        // when (操作):
        manager.handle_event(SocketEvent::new(
            transport.last_id(),
            SocketSignal::Message(text.to_string()),
        ));

        // then (期待する結果):
        let last = manager.transcript().last().unwrap();
        assert_eq!(last.direction, Direction::Inbound);
        assert_eq!(last.text, text);
    }

    #[test]
    fn test_transcript_preserves_signal_order() {
        // テスト項目: トランスクリプトはシグナルを観測した順序を保つ
        // given (前提条件):
        let (mut manager, transport) = create_test_manager();
        open(&mut manager, &transport);
        let id = transport.last_id();

        // when (操作):
        manager.send(&frame("roomHello,r1,{}"));
        manager.handle_event(SocketEvent::new(id, SocketSignal::Message("a".to_string())));
        manager.send(&frame("room,r1,{}"));
        manager.handle_event(SocketEvent::new(id, SocketSignal::Message("b".to_string())));
        manager.handle_event(SocketEvent::new(id, SocketSignal::Close(1000)));

        // then (期待する結果):
        let texts: Vec<&str> = manager
            .transcript()
            .entries()
            .iter()
            .map(|e| e.text.as_str())
            .collect();
        assert_eq!(
            texts,
            vec![
                "Connection established",
                "roomHello,r1,{}",
                "a",
                "room,r1,{}",
                "b",
                "Connection closed: 1000",
            ]
        );
    }

    #[test]
    fn test_stale_socket_events_are_ignored() {
        // テスト項目: 以前のソケットからのイベントは無視される
        // given (前提条件):
        let (mut manager, transport) = create_test_manager();
        open(&mut manager, &transport);
        let old = transport.last_id();
        manager.handle_event(SocketEvent::new(old, SocketSignal::Close(1000)));
        manager.connect();
        let entries_before = manager.transcript().len();

        // when (操作):
        manager.handle_event(SocketEvent::new(old, SocketSignal::Open));
        manager.handle_event(SocketEvent::new(old, SocketSignal::Close(1006)));

        // then (期待する結果):
        assert_eq!(manager.state(), ConnectionState::Connecting);
        assert_eq!(manager.transcript().len(), entries_before);
    }

    #[test]
    fn test_events_while_disconnected_are_ignored() {
        // テスト項目: 未接続時に届いたイベントは状態を変えない
        // given (前提条件):
        let (mut manager, _transport) = create_test_manager();

        // when (操作):
        manager.handle_event(SocketEvent::new(SocketId(42), SocketSignal::Open));

        // then (期待する結果):
        assert_eq!(manager.state(), ConnectionState::Disconnected);
        assert!(manager.transcript().is_empty());
    }

    #[test]
    fn test_duplicate_open_is_ignored() {
        // テスト項目: 接続済みでの重複 open シグナルはエントリを追加しない
        // given (前提条件):
        let (mut manager, transport) = create_test_manager();
        open(&mut manager, &transport);

        // when (操作):
        manager.handle_event(SocketEvent::new(transport.last_id(), SocketSignal::Open));

        // then (期待する結果):
        assert_eq!(manager.state(), ConnectionState::Connected);
        assert_eq!(manager.transcript().len(), 1);
    }

    #[test]
    fn test_observers_receive_lifecycle_callbacks() {
        // テスト項目: オブザーバーに open / message / error / close が通知される
        // given (前提条件):
        let (mut manager, transport) = create_test_manager();
        let mut observer = MockConnectionObserver::new();
        let mut seq = mockall::Sequence::new();
        observer
            .expect_on_open()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        observer
            .expect_on_message()
            .withf(|text: &str| text == "hello")
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        observer
            .expect_on_error()
            .withf(|detail: &str| detail == "reset")
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        observer
            .expect_on_close()
            .withf(|code: &u16| *code == 1006)
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        manager.add_observer(Box::new(observer));

        // when (操作):
        open(&mut manager, &transport);
        let id = transport.last_id();
        manager.handle_event(SocketEvent::new(id, SocketSignal::Message("hello".to_string())));
        manager.handle_event(SocketEvent::new(id, SocketSignal::Error("reset".to_string())));
        manager.handle_event(SocketEvent::new(id, SocketSignal::Close(1006)));

        // then (期待する結果):
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_report_appends_system_entry() {
        // テスト項目: report はシステムエントリを追加する
        // given (前提条件):
        let (mut manager, _transport) = create_test_manager();

        // when (操作):
        manager.report("Error: boom");

        // then (期待する結果):
        let last = manager.transcript().last().unwrap();
        assert_eq!(last.direction, Direction::System);
        assert_eq!(last.text, "Error: boom");
    }
}
