//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener and a real client so the tests cover
//! the actual frame handling, not just the trait surface.

#[cfg(feature = "websocket")]
mod websocket {
    use holdfast_transport::{Connection, Transport, WebSocketTransport};

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn connect_client(addr: &str) -> ClientWs {
        let (ws, _) =
            tokio_tungstenite::connect_async(format!("ws://{addr}"))
                .await
                .expect("client should connect");
        ws
    }

    /// Binds on port 0 and returns the transport plus its actual address.
    async fn bind_any() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport
            .local_addr()
            .expect("should have local addr")
            .to_string();
        (transport, addr)
    }

    #[tokio::test]
    async fn test_send_arrives_as_text_frame() {
        let (mut transport, addr) = bind_any().await;
        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.expect("accept task");
        assert!(server_conn.id().into_inner() > 0);

        server_conn
            .send(br#"{"type":"GAME_STARTED"}"#)
            .await
            .expect("send should succeed");

        use futures_util::StreamExt;
        let msg = client_ws.next().await.unwrap().unwrap();
        // The wire protocol is JSON, so it goes out as a text frame.
        assert!(msg.is_text());
        assert_eq!(msg.into_data().as_ref(), br#"{"type":"GAME_STARTED"}"#);
    }

    #[tokio::test]
    async fn test_recv_accepts_text_and_binary() {
        use futures_util::SinkExt;
        use tokio_tungstenite::tungstenite::Message;

        let (mut transport, addr) = bind_any().await;
        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        client_ws
            .send(Message::Text("as text".into()))
            .await
            .unwrap();
        let got = server_conn.recv().await.unwrap().unwrap();
        assert_eq!(got, b"as text");

        client_ws
            .send(Message::Binary(b"as bytes".to_vec().into()))
            .await
            .unwrap();
        let got = server_conn.recv().await.unwrap().unwrap();
        assert_eq!(got, b"as bytes");
    }

    #[tokio::test]
    async fn test_recv_returns_none_on_client_close() {
        use futures_util::SinkExt;
        use tokio_tungstenite::tungstenite::Message;

        let (mut transport, addr) = bind_any().await;
        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_send_completes_while_recv_is_waiting() {
        use std::time::Duration;

        use futures_util::StreamExt;

        let (mut transport, addr) = bind_any().await;
        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        // Park one clone in recv with no inbound frame on the way,
        // the way a per-connection read loop sits between requests.
        let reader = server_conn.clone();
        let read_task =
            tokio::spawn(async move { reader.recv().await });
        tokio::task::yield_now().await;

        // A concurrent send must still go through; the two directions
        // must not share one lock.
        tokio::time::timeout(
            Duration::from_secs(5),
            server_conn.send(b"reply"),
        )
        .await
        .expect("send must not wait on the idle reader")
        .expect("send should succeed");

        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"reply");

        read_task.abort();
    }

    #[tokio::test]
    async fn test_connection_ids_are_unique_per_accept() {
        let (mut transport, addr) = bind_any().await;
        let server_handle = tokio::spawn(async move {
            let a = transport.accept().await.expect("first accept");
            let b = transport.accept().await.expect("second accept");
            (a, b)
        });

        let _c1 = connect_client(&addr).await;
        let _c2 = connect_client(&addr).await;
        let (a, b) = server_handle.await.unwrap();

        assert_ne!(a.id(), b.id());
    }
}
