//! Broadcast fan-out.
//!
//! The router turns "event from source X at LOD L" into the minimum set
//! of queue writes, using the reverse visibility index. A failed or
//! dropped recipient never aborts a fan-out; the packet class decides
//! whether a saturated recipient loses the packet or the connection.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, trace};

use aden_network::{ClientRegistry, ConnState, PacketClass, SendError};
use aden_protocol::{Encode, Packet};
use aden_world::{LodLevel, ObjectId, RegionPos, VisibilityManager, World, WorldObject};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("player is offline")]
    Offline,
    #[error("player is not in game")]
    NotInGame,
    #[error("recipient queue refused the packet")]
    Refused,
}

pub struct BroadcastRouter {
    registry: Arc<ClientRegistry>,
    world: Arc<World>,
    visibility: Arc<VisibilityManager>,
}

impl BroadcastRouter {
    pub fn new(
        registry: Arc<ClientRegistry>,
        world: Arc<World>,
        visibility: Arc<VisibilityManager>,
    ) -> Self {
        Self {
            registry,
            world,
            visibility,
        }
    }

    /// Encodes a packet once; fan-out then clones the cheap handle.
    pub fn encode<P>(packet: &P) -> anyhow::Result<Bytes>
    where
        P: Packet + Encode,
    {
        let mut buf = Vec::new();
        packet.encode_with_id(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    /// Writes to every client at or past AUTHENTICATED. O(clients); for
    /// global announcements only. Returns the delivery count.
    pub fn broadcast_to_all(&self, body: &Bytes, class: PacketClass) -> usize {
        let mut delivered = 0;

        self.registry.for_each_client(|conn| {
            if conn.state().at_least_authenticated() {
                match conn.send(body.clone(), class) {
                    Ok(()) => delivered += 1,
                    Err(err) => {
                        debug!(conn_id = conn.conn_id(), %err, "skipping recipient");
                    }
                }
            }
            true
        });

        delivered
    }

    /// Delivers to every still-in-game observer that sees `source` at
    /// `lod`, excluding `source` itself.
    pub fn broadcast_to_visible(
        &self,
        source: ObjectId,
        lod: LodLevel,
        body: &Bytes,
        class: PacketClass,
    ) -> usize {
        self.broadcast_to_visible_except(source, None, lod, body, class)
    }

    /// Same, with one extra excluded observer.
    pub fn broadcast_to_visible_except(
        &self,
        source: ObjectId,
        except: Option<ObjectId>,
        lod: LodLevel,
        body: &Bytes,
        class: PacketClass,
    ) -> usize {
        let mut delivered = 0;

        for observer in self.visibility.observers_of(source) {
            if observer == source || Some(observer) == except {
                continue;
            }

            // Confirm membership at the requested level against the
            // observer's own bucket.
            if !self.visibility.sees_at(observer, source, lod) {
                continue;
            }

            let Some(conn) = self.registry.get_by_object_id(observer) else {
                continue;
            };

            if conn.state() != ConnState::InGame {
                continue;
            }

            match conn.send(body.clone(), class) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    debug!(conn_id = conn.conn_id(), %err, "skipping observer");
                }
            }
        }

        trace!(source = source.0, ?lod, delivered, "visibility broadcast");
        delivered
    }

    /// Sourceless broadcast (NPC events): players in the 3×3 block around
    /// the position.
    pub fn broadcast_from_position(
        &self,
        x: i32,
        y: i32,
        body: &Bytes,
        class: PacketClass,
    ) -> usize {
        let mut delivered = 0;

        self.world
            .for_each_visible_object(x, y, LodLevel::All, |obj| {
                if let WorldObject::Player(player) = obj {
                    if let Some(conn) = self.registry.get_by_object_id(player.id) {
                        if conn.state() == ConnState::InGame
                            && conn.send(body.clone(), class).is_ok()
                        {
                            delivered += 1;
                        }
                    }
                }
                true
            });

        delivered
    }

    /// O(1) direct send through the object-id index.
    pub fn send_to_player(
        &self,
        id: ObjectId,
        body: &Bytes,
        class: PacketClass,
    ) -> Result<(), RouteError> {
        let conn = self.registry.get_by_object_id(id).ok_or(RouteError::Offline)?;

        if conn.state() != ConnState::InGame {
            return Err(RouteError::NotInGame);
        }

        conn.send(body.clone(), class).map_err(|err| match err {
            SendError::Dropped => RouteError::Refused,
            SendError::Closed => RouteError::Offline,
        })
    }

    /// Every in-game player whose current region equals `(rx, ry)`.
    pub fn broadcast_to_region(
        &self,
        region: RegionPos,
        body: &Bytes,
        class: PacketClass,
    ) -> usize {
        let mut delivered = 0;

        self.registry.for_each_player(|player, conn| {
            if player.location().region() == region
                && conn.state() == ConnState::InGame
                && conn.send(body.clone(), class).is_ok()
            {
                delivered += 1;
            }
            true
        });

        delivered
    }

    // Typed conveniences over the byte-level operations.

    pub fn send_packet_to_player<P>(
        &self,
        id: ObjectId,
        packet: &P,
        class: PacketClass,
    ) -> Result<(), RouteError>
    where
        P: Packet + Encode,
    {
        let body = Self::encode(packet).map_err(|_| RouteError::Refused)?;
        self.send_to_player(id, &body, class)
    }

    pub fn broadcast_packet_to_visible<P>(
        &self,
        source: ObjectId,
        lod: LodLevel,
        packet: &P,
        class: PacketClass,
    ) -> usize
    where
        P: Packet + Encode,
    {
        match Self::encode(packet) {
            Ok(body) => self.broadcast_to_visible(source, lod, &body, class),
            Err(err) => {
                debug!(%err, "failed to encode broadcast packet");
                0
            }
        }
    }
}
