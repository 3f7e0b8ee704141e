//! Marker pins on the map.
//!
//! The annotation engine hands out [`PinToken`]s through [`PinQueue`]; the
//! queued attach/release operations are turned into `MarkerPin` entities by
//! [`sync_marker_pins`] once per frame.

use bevy::prelude::*;

use crate::annotation::widget::MarkerRenderer;
use crate::annotation::{Annotations, Marker, MarkerId};

use super::projection::geo_to_world;

pub type PinToken = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum PinOp {
    Attach { token: PinToken, marker: Marker },
    Release(PinToken),
}

/// Marker renderer that records operations for the ECS to apply.
#[derive(Debug, Default)]
pub struct PinQueue {
    next: PinToken,
    ops: Vec<PinOp>,
}

impl PinQueue {
    pub fn drain(&mut self) -> Vec<PinOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl MarkerRenderer for PinQueue {
    type Handle = PinToken;

    fn attach(&mut self, marker: &Marker) -> PinToken {
        let token = self.next;
        self.next += 1;
        self.ops.push(PinOp::Attach {
            token,
            marker: *marker,
        });
        token
    }

    fn release(&mut self, token: PinToken) {
        self.ops.push(PinOp::Release(token));
    }
}

#[derive(Component)]
pub struct MarkerPin {
    pub token: PinToken,
    pub id: MarkerId,
}

/// Applies queued pin operations: spawns a pin per attach and despawns the
/// pin of each release.
pub fn sync_marker_pins(
    mut commands: Commands,
    mut annotations: ResMut<Annotations>,
    pins: Query<(Entity, &MarkerPin)>,
) {
    if annotations.renderer().is_empty() {
        return;
    }

    let ops = annotations.renderer_mut().drain();
    // Pins attached and released within the same batch never get an entity
    let released: Vec<PinToken> = ops
        .iter()
        .filter_map(|op| match op {
            PinOp::Release(token) => Some(*token),
            PinOp::Attach { .. } => None,
        })
        .collect();

    for op in ops {
        match op {
            PinOp::Attach { token, marker } => {
                if released.contains(&token) {
                    continue;
                }
                commands.spawn((
                    MarkerPin {
                        token,
                        id: marker.id,
                    },
                    Transform::from_translation(geo_to_world(marker.lng, marker.lat).extend(10.0)),
                    Visibility::default(),
                ));
            }
            PinOp::Release(token) => {
                if let Some((entity, _)) = pins.iter().find(|(_, pin)| pin.token == token) {
                    commands.entity(entity).despawn();
                }
            }
        }
    }
}

/// Id of the pin within `radius` world units of `position`, nearest first.
pub fn pin_at<'a>(
    pins: impl IntoIterator<Item = (&'a MarkerPin, &'a Transform)>,
    position: Vec2,
    radius: f32,
) -> Option<MarkerId> {
    pins.into_iter()
        .map(|(pin, transform)| (pin.id, transform.translation.truncate().distance(position)))
        .filter(|(_, distance)| *distance <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(id: MarkerId) -> Marker {
        Marker {
            id,
            lng: 1.0,
            lat: 2.0,
        }
    }

    #[test]
    fn test_queue_records_attach_and_release() {
        let mut queue = PinQueue::default();
        let a = queue.attach(&marker(10));
        let b = queue.attach(&marker(11));
        assert_ne!(a, b);
        queue.release(a);

        let ops = queue.drain();
        assert_eq!(
            ops,
            vec![
                PinOp::Attach {
                    token: a,
                    marker: marker(10)
                },
                PinOp::Attach {
                    token: b,
                    marker: marker(11)
                },
                PinOp::Release(a),
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_tokens_never_reused_after_drain() {
        let mut queue = PinQueue::default();
        let a = queue.attach(&marker(1));
        queue.drain();
        let b = queue.attach(&marker(2));
        assert_ne!(a, b);
    }

    #[test]
    fn test_pin_at_picks_nearest_in_radius() {
        let near = (
            MarkerPin { token: 0, id: 100 },
            Transform::from_xyz(10.0, 0.0, 0.0),
        );
        let nearer = (
            MarkerPin { token: 1, id: 200 },
            Transform::from_xyz(3.0, 0.0, 0.0),
        );
        let pins = [&near, &nearer].map(|(pin, transform)| (pin, transform));

        assert_eq!(pin_at(pins, Vec2::ZERO, 12.0), Some(200));
        assert_eq!(pin_at(pins, Vec2::ZERO, 1.0), None);
    }
}
