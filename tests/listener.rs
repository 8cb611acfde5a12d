//! End-to-end tests for the MLLP listener over TCP.

mod common;

use std::net::{Ipv4Addr, SocketAddr};

use common::{Client, SAMPLE, envelope, msa, next_call, recording_handler, sample_with_id};
use hl7_mllp::{ErrorKind, ListenerHandle, MllpServer, RequestOutcome};
use rstest::{fixture, rstest};
use tokio::{
    sync::mpsc::UnboundedReceiver,
    time::{Duration, sleep, timeout},
};

#[fixture]
fn listener() -> (ListenerHandle, UnboundedReceiver<common::Call>) {
    let (handler, rx) = recording_handler();
    let handle = MllpServer::new(handler)
        .workers(2)
        .bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
        .expect("bind")
        .spawn();
    (handle, rx)
}

fn addr(handle: &ListenerHandle) -> SocketAddr { handle.local_addr().expect("bound address") }

#[rstest]
#[tokio::test]
async fn frame_split_across_writes_is_acknowledged(
    listener: (ListenerHandle, UnboundedReceiver<common::Call>),
) {
    let (handle, mut rx) = listener;
    let mut client = Client::connect(addr(&handle)).await;
    let wire = envelope(SAMPLE);
    let (head, tail) = wire.split_at(20);

    client.write(head).await;
    sleep(Duration::from_millis(20)).await;
    assert!(rx.try_recv().is_err(), "dispatched before the trailer arrived");
    client.write(tail).await;

    let ack = client.ack().await;
    assert_eq!(msa(&ack), ("AA".to_string(), "MSG1".to_string()));
    assert_eq!(ack.message_type(), "ACK");
    assert_eq!(ack.sending_application(), "C");
    assert_eq!(ack.receiving_application(), "A");

    let call = next_call(&mut rx).await;
    let request = call.outcome.request().expect("parsed request");
    assert_eq!(request.raw().as_bytes(), wire.as_slice());
    assert_eq!(request.message_type(), "ADT");
    assert_eq!(request.event(), "A01");

    client.finish().await;
    assert!(next_call(&mut rx).await.outcome.is_close());
    handle.stop();
    handle.wait().await;
}

#[rstest]
#[tokio::test]
async fn parse_failure_is_rejected_without_closing(
    listener: (ListenerHandle, UnboundedReceiver<common::Call>),
) {
    let (handle, mut rx) = listener;
    let mut client = Client::connect(addr(&handle)).await;

    client.write(&envelope("not an hl7 message")).await;
    let (code, _) = msa(&client.ack().await);
    assert_eq!(code, "AR");
    let call = next_call(&mut rx).await;
    assert_eq!(call.outcome.err_type(), Some(ErrorKind::Parse));
    let failed = call.outcome.failure().expect("failure");
    assert!(failed.err().contains("MSH"));

    client.write(&envelope(sample_with_id("MSG2"))).await;
    assert_eq!(
        msa(&client.ack().await),
        ("AA".to_string(), "MSG2".to_string())
    );
    assert!(matches!(next_call(&mut rx).await.outcome, RequestOutcome::Ok(_)));
}

#[rstest]
#[tokio::test]
async fn connections_are_independent(
    listener: (ListenerHandle, UnboundedReceiver<common::Call>),
) {
    let (handle, mut rx) = listener;
    let mut first = Client::connect(addr(&handle)).await;
    let mut second = Client::connect(addr(&handle)).await;

    // Half a frame on the first connection must not hold up the second.
    let wire = envelope(sample_with_id("FIRST"));
    first.write(&wire[..10]).await;
    second.write(&envelope(sample_with_id("SECOND"))).await;
    assert_eq!(msa(&second.ack().await).1, "SECOND");

    first.write(&wire[10..]).await;
    assert_eq!(msa(&first.ack().await).1, "FIRST");

    let mut ids = Vec::new();
    for _ in 0..2 {
        let call = next_call(&mut rx).await;
        ids.push(
            call.outcome
                .request()
                .expect("parsed request")
                .message()
                .control_id(),
        );
    }
    ids.sort();
    assert_eq!(ids, ["FIRST", "SECOND"]);
}

#[rstest]
#[tokio::test]
async fn stop_refuses_new_sessions_but_keeps_open_ones(
    listener: (ListenerHandle, UnboundedReceiver<common::Call>),
) {
    let (handle, mut rx) = listener;
    let mut open = Client::connect(addr(&handle)).await;
    open.write(&envelope(SAMPLE)).await;
    open.ack().await;
    next_call(&mut rx).await;

    handle.stop();
    assert!(handle.is_stopped());
    sleep(Duration::from_millis(50)).await;
    assert!(
        tokio::net::TcpStream::connect(addr(&handle)).await.is_err(),
        "listening socket should be closed after stop"
    );

    open.write(&envelope(sample_with_id("AFTER"))).await;
    assert_eq!(msa(&open.ack().await).1, "AFTER");
    assert!(
        timeout(Duration::from_millis(100), handle.wait())
            .await
            .is_err()
    );

    open.finish().await;
    timeout(Duration::from_secs(5), handle.wait())
        .await
        .expect("listener finishes once the last session closes");
}

#[tokio::test]
async fn ack_terminator_follows_append_cr() {
    let (handler, _rx) = recording_handler();
    let handle = MllpServer::new(handler)
        .append_cr(true)
        .bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
        .expect("bind")
        .spawn();
    let stream = tokio::net::TcpStream::connect(addr(&handle))
        .await
        .expect("connect");
    let (mut rx, mut tx) = stream.into_split();

    tokio::io::AsyncWriteExt::write_all(&mut tx, &envelope(SAMPLE))
        .await
        .expect("write");
    let mut wire = Vec::new();
    let mut buf = [0u8; 512];
    while !wire.ends_with(&[0x1c, 0x0d]) {
        let n = tokio::io::AsyncReadExt::read(&mut rx, &mut buf)
            .await
            .expect("read");
        assert_ne!(n, 0, "connection closed before the ack trailer");
        wire.extend_from_slice(&buf[..n]);
    }
    assert_eq!(wire.first(), Some(&0x0b));
    assert!(wire.ends_with(b"MSA|AA|MSG1\r\x1c\r"));
}
