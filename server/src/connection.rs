use actix::prelude::SendError;
use actix::{
    Actor, ActorContext, AsyncContext, Handler, Message, Recipient, Running, StreamHandler,
};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tokio::sync::mpsc::Receiver;

use system::codec::{self, Frame, FrameFormat};
use system::{ClientEvent, ConnectionId, ProtocolError, ServerEvent};

use crate::config::Config;
use crate::connection_tx_storage::ConnectionTx;
use crate::server::ServerTx;

#[derive(Debug)]
pub enum ConnectionCommand {
    Connect {
        tx: ConnectionTx,
    },
    Disconnect {
        from: ConnectionId,
    },
    ClientEvent {
        from: ConnectionId,
        event: ClientEvent,
    },
}

#[derive(Message)]
#[rtype(result = "()")]
struct ConnectionActorMessage(ServerEvent);

enum InboundFrame<'a> {
    Text(&'a str),
    Binary(&'a [u8]),
    Unsupported(&'static str),
}

#[derive(Debug, PartialEq)]
enum Ingress {
    Forward(ConnectionId, ClientEvent),
    Queued,
    Reject(ServerEvent),
}

/// Per-connection frame bookkeeping, independent of the WebSocket actor.
struct ConnectionState {
    /// Unknown until the server's `Connected` arrives.
    id: Option<ConnectionId>,
    /// Replies use the format of the last frame the client sent.
    format: FrameFormat,
    /// Events received before the identity is known, in arrival order.
    pending: Vec<ClientEvent>,
}

impl ConnectionState {
    fn new() -> Self {
        Self {
            id: None,
            format: FrameFormat::default(),
            pending: Vec::new(),
        }
    }

    fn receive(&mut self, frame: InboundFrame<'_>) -> Ingress {
        let decoded = match frame {
            InboundFrame::Text(text) => {
                self.format = FrameFormat::Text;
                codec::decode_text(text)
            }
            InboundFrame::Binary(bytes) => {
                self.format = FrameFormat::Binary;
                codec::decode_binary(bytes)
            }
            InboundFrame::Unsupported(kind) => Err(ProtocolError::UnsupportedFrame(kind)),
        };

        match decoded {
            Ok(event) => match self.id {
                Some(from) => Ingress::Forward(from, event),
                None => {
                    self.pending.push(event);
                    Ingress::Queued
                }
            },
            Err(err) => {
                log::warn!("Rejected frame: {}", err);
                Ingress::Reject(ServerEvent::Error(err.report()))
            }
        }
    }

    /// Records the identity and hands back everything queued so far.
    fn connected(&mut self, id: ConnectionId) -> Vec<ClientEvent> {
        self.id = Some(id);
        std::mem::take(&mut self.pending)
    }

    fn encode(&self, event: &ServerEvent) -> Result<Frame, ProtocolError> {
        codec::encode(event, self.format)
    }
}

/// Moves outbox events to the actor until either side goes away. `deliver`
/// hands the event back when the actor has stopped.
async fn pump_outbox<F>(mut rx: Receiver<ServerEvent>, srv_tx: ServerTx, mut deliver: F)
where
    F: FnMut(ServerEvent) -> Result<(), ServerEvent>,
{
    log::debug!("connection green thread - started");
    while let Some(event) = rx.recv().await {
        if let Err(undelivered) = deliver(event) {
            // The actor stopped before it learned its identity, so it could
            // not report the disconnect itself.
            if let ServerEvent::Connected(user) = undelivered {
                let _ = srv_tx.send(ConnectionCommand::Disconnect {
                    from: user.user_id,
                });
            }
            break;
        }
    }
    log::debug!("connection green thread - terminated");
}

struct ConnectionActor {
    connection: ConnectionState,
    srv_tx: ServerTx,
    outbox_capacity: usize,
}

impl ConnectionActor {
    fn new(srv_tx: ServerTx, outbox_capacity: usize) -> Self {
        Self {
            connection: ConnectionState::new(),
            srv_tx,
            outbox_capacity,
        }
    }

    fn ingress(&mut self, frame: InboundFrame<'_>, ctx: &mut ws::WebsocketContext<Self>) {
        match self.connection.receive(frame) {
            Ingress::Forward(from, event) => self.forward(from, event, ctx),
            Ingress::Queued => {}
            Ingress::Reject(event) => self.egress(&event, ctx),
        }
    }

    fn forward(
        &self,
        from: ConnectionId,
        event: ClientEvent,
        ctx: &mut ws::WebsocketContext<Self>,
    ) {
        log::debug!("Ingress {:?}", event);
        if self
            .srv_tx
            .send(ConnectionCommand::ClientEvent { from, event })
            .is_err()
        {
            log::error!("Server is gone; closing connection {}", from);
            ctx.stop();
        }
    }

    fn egress(&self, event: &ServerEvent, ctx: &mut ws::WebsocketContext<Self>) {
        match self.connection.encode(event) {
            Ok(Frame::Text(text)) => ctx.text(text),
            Ok(Frame::Binary(bytes)) => ctx.binary(bytes),
            Err(err) => log::error!("Egress failed: {}", err),
        }
    }
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let (tx, rx) = tokio::sync::mpsc::channel::<ServerEvent>(self.outbox_capacity);

        if self.srv_tx.send(ConnectionCommand::Connect { tx }).is_err() {
            log::error!("Server is gone; refusing connection");
            ctx.stop();
            return;
        }

        let addr: Recipient<ConnectionActorMessage> = ctx.address().recipient();
        let deliver = move |event| match addr.try_send(ConnectionActorMessage(event)) {
            Ok(()) => Ok(()),
            Err(SendError::Full(msg)) => {
                addr.do_send(msg);
                Ok(())
            }
            Err(SendError::Closed(ConnectionActorMessage(event))) => Err(event),
        };

        tokio::spawn(pump_outbox(rx, self.srv_tx.clone(), deliver));
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        if let Some(id) = self.connection.id {
            let _ = self.srv_tx.send(ConnectionCommand::Disconnect { from: id });
        }

        Running::Stop
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Text(text)) => self.ingress(InboundFrame::Text(&text), ctx),
            Ok(ws::Message::Binary(bin)) => {
                log::debug!("Ingress size: {}", bin.len());
                self.ingress(InboundFrame::Binary(&bin), ctx);
            }
            Ok(ws::Message::Continuation(_)) => {
                self.ingress(InboundFrame::Unsupported("continuation"), ctx)
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(err) => {
                log::warn!("WebSocket protocol error: {}", err);
                ctx.stop();
            }
            Ok(ws::Message::Pong(_)) | Ok(ws::Message::Nop) => (),
        }
    }
}

/// Egress
impl Handler<ConnectionActorMessage> for ConnectionActor {
    type Result = ();

    fn handle(
        &mut self,
        msg: ConnectionActorMessage,
        ctx: &mut ws::WebsocketContext<Self>,
    ) -> Self::Result {
        let event = msg.0;
        log::debug!("Egress {}", event.name());
        self.egress(&event, ctx);

        if let ServerEvent::Connected(user) = &event {
            let from = user.user_id;
            for pending in self.connection.connected(from) {
                self.forward(from, pending, ctx);
            }
        }
    }
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    srv_tx: web::Data<ServerTx>,
    config: web::Data<Config>,
) -> Result<HttpResponse, Error> {
    ws::start(
        ConnectionActor::new(srv_tx.get_ref().clone(), config.outbox_capacity),
        &req,
        stream,
    )
}
