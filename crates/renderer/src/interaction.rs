//! Hover effects computed from the pointer position relative to an element's
//! bounding box: a 3D tilt for cards and a magnetic pull for buttons.

use fxconfig::{MagneticSettings, TiltSettings};

use crate::types::{Point, Rect};

/// Card tilt in degrees plus the spotlight position in percent of the box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tilt {
    pub rotate_x: f32,
    pub rotate_y: f32,
    pub spotlight_x: f32,
    pub spotlight_y: f32,
    pub scale: f32,
}

impl Tilt {
    pub const NEUTRAL: Tilt = Tilt {
        rotate_x: 0.0,
        rotate_y: 0.0,
        spotlight_x: 50.0,
        spotlight_y: 50.0,
        scale: 1.0,
    };

    /// Projects a point of the card, given relative to the card centre, to
    /// the screen. The card is scaled, rotated about Y then X, and viewed
    /// from `perspective` pixels in front of the page.
    pub fn project(&self, center: Point, local: Point, perspective: f32) -> Point {
        let (sin_y, cos_y) = self.rotate_y.to_radians().sin_cos();
        let (sin_x, cos_x) = self.rotate_x.to_radians().sin_cos();
        let x = local.x * self.scale;
        let y = local.y * self.scale;

        let (x, z) = (x * cos_y, -x * sin_y);
        let (y, z) = (y * cos_x - z * sin_x, y * sin_x + z * cos_x);

        let depth = perspective - z;
        let factor = if perspective > 0.0 && depth > 0.0 {
            perspective / depth
        } else {
            1.0
        };
        Point::new(center.x + x * factor, center.y + y * factor)
    }
}

pub fn tilt(rect: Rect, pointer: Point, settings: &TiltSettings) -> Tilt {
    let x = pointer.x - rect.x;
    let y = pointer.y - rect.y;
    let center_x = rect.width / 2.0;
    let center_y = rect.height / 2.0;
    let percent = |value: f32, extent: f32| {
        if extent > 0.0 {
            value / extent * 100.0
        } else {
            50.0
        }
    };
    Tilt {
        rotate_x: (y - center_y) / settings.divisor,
        rotate_y: (center_x - x) / settings.divisor,
        spotlight_x: percent(x, rect.width),
        spotlight_y: percent(y, rect.height),
        scale: settings.hover_scale,
    }
}

/// Translation applied to a magnetic element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Magnet {
    pub dx: f32,
    pub dy: f32,
    pub scale: f32,
}

impl Magnet {
    pub const IDENTITY: Magnet = Magnet {
        dx: 0.0,
        dy: 0.0,
        scale: 1.0,
    };
}

/// Pull towards the pointer, or `None` when the pointer is at or beyond
/// `max_distance` from the element centre.
pub fn magnetic(rect: Rect, pointer: Point, settings: &MagneticSettings) -> Option<Magnet> {
    let center = rect.center();
    let x = pointer.x - center.x;
    let y = pointer.y - center.y;
    let distance = x.hypot(y);
    if distance >= settings.max_distance {
        return None;
    }
    let pull = (settings.max_distance - distance) / settings.max_distance * settings.strength;
    Some(Magnet {
        dx: x * pull,
        dy: y * pull,
        scale: settings.hover_scale,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum HoverKind {
    Tilt(TiltSettings),
    Magnetic(MagneticSettings),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    Tilt(Tilt),
    Magnet(Magnet),
}

/// Element with a hover effect. Tracks whether the pointer is inside and the
/// transform currently applied.
#[derive(Debug, Clone)]
pub struct HoverTarget {
    rect: Rect,
    kind: HoverKind,
    hovered: bool,
    transform: Transform,
}

impl HoverTarget {
    pub fn new(rect: Rect, kind: HoverKind) -> Self {
        let transform = Self::resting(&kind);
        Self {
            rect,
            kind,
            hovered: false,
            transform,
        }
    }

    fn resting(kind: &HoverKind) -> Transform {
        match kind {
            HoverKind::Tilt(_) => Transform::Tilt(Tilt::NEUTRAL),
            HoverKind::Magnetic(_) => Transform::Magnet(Magnet::IDENTITY),
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn kind(&self) -> &HoverKind {
        &self.kind
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Screen corners of the box as currently displayed, in
    /// [`Rect::corners`] order.
    pub fn displayed_quad(&self) -> [Point; 4] {
        match self.transform {
            Transform::Tilt(tilt) => {
                let center = self.rect.center();
                let perspective = self.perspective();
                self.rect.corners().map(|corner| {
                    tilt.project(center, corner.offset(-center.x, -center.y), perspective)
                })
            }
            Transform::Magnet(magnet) => self
                .rect
                .translate(magnet.dx, magnet.dy)
                .scale(magnet.scale)
                .corners(),
        }
    }

    fn perspective(&self) -> f32 {
        match &self.kind {
            HoverKind::Tilt(settings) => settings.perspective,
            HoverKind::Magnetic(_) => 0.0,
        }
    }

    /// Screen position of a hovered card's spotlight.
    pub fn spotlight(&self) -> Option<Point> {
        let Transform::Tilt(tilt) = self.transform else {
            return None;
        };
        if !self.hovered {
            return None;
        }
        let local = Point::new(
            (tilt.spotlight_x / 100.0 - 0.5) * self.rect.width,
            (tilt.spotlight_y / 100.0 - 0.5) * self.rect.height,
        );
        Some(tilt.project(self.rect.center(), local, self.perspective()))
    }

    /// Feeds a pointer position. Leaving the box resets the transform, and so
    /// does a magnet's pointer moving out of reach. Returns whether the
    /// transform changed.
    pub fn pointer_moved(&mut self, pointer: Point) -> bool {
        if !self.rect.contains(pointer) {
            return self.pointer_left();
        }
        self.hovered = true;
        let next = match &self.kind {
            HoverKind::Tilt(settings) => Transform::Tilt(tilt(self.rect, pointer, settings)),
            HoverKind::Magnetic(settings) => match magnetic(self.rect, pointer, settings) {
                Some(magnet) => Transform::Magnet(magnet),
                None => Transform::Magnet(Magnet::IDENTITY),
            },
        };
        let changed = next != self.transform;
        self.transform = next;
        changed
    }

    pub fn pointer_left(&mut self) -> bool {
        let was_hovered = std::mem::replace(&mut self.hovered, false);
        let resting = Self::resting(&self.kind);
        let changed = self.transform != resting;
        self.transform = resting;
        was_hovered && changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> Rect {
        Rect::new(100.0, 100.0, 300.0, 200.0)
    }

    #[test]
    fn tilt_at_center_is_flat() {
        let result = tilt(card(), Point::new(250.0, 200.0), &TiltSettings::default());
        assert_eq!(result.rotate_x, 0.0);
        assert_eq!(result.rotate_y, 0.0);
        assert_eq!(result.spotlight_x, 50.0);
        assert_eq!(result.scale, 1.01);
    }

    #[test]
    fn tilt_at_top_left_corner() {
        let result = tilt(card(), Point::new(100.0, 100.0), &TiltSettings::default());
        assert_eq!(result.rotate_x, -4.0);
        assert_eq!(result.rotate_y, 6.0);
        assert_eq!(result.spotlight_x, 0.0);
        assert_eq!(result.spotlight_y, 0.0);
    }

    #[test]
    fn magnetic_pulls_toward_pointer_within_reach() {
        let button = Rect::new(0.0, 0.0, 100.0, 40.0);
        let result = magnetic(button, Point::new(90.0, 20.0), &MagneticSettings::default()).unwrap();
        // offset 40, pull (80 - 40) / 80 * 0.3
        assert!((result.dx - 6.0).abs() < 1e-5);
        assert_eq!(result.dy, 0.0);
        assert_eq!(result.scale, 1.05);
        assert!(magnetic(button, Point::new(130.0, 20.0), &MagneticSettings::default()).is_none());
    }

    #[test]
    fn magnet_releases_out_of_reach_and_on_leave() {
        let mut target = HoverTarget::new(
            Rect::new(0.0, 0.0, 200.0, 40.0),
            HoverKind::Magnetic(MagneticSettings::default()),
        );
        assert!(target.pointer_moved(Point::new(110.0, 20.0)));
        assert_ne!(target.transform(), Transform::Magnet(Magnet::IDENTITY));

        // 95 from the centre: still over the button, beyond the 80 reach
        assert!(target.pointer_moved(Point::new(195.0, 20.0)));
        assert!(target.is_hovered());
        assert_eq!(target.transform(), Transform::Magnet(Magnet::IDENTITY));

        target.pointer_moved(Point::new(110.0, 20.0));
        assert!(target.pointer_moved(Point::new(400.0, 20.0)));
        assert!(!target.is_hovered());
        assert_eq!(target.transform(), Transform::Magnet(Magnet::IDENTITY));
    }

    #[test]
    fn tilt_resets_to_neutral_on_exit() {
        let mut target = HoverTarget::new(card(), HoverKind::Tilt(TiltSettings::default()));
        assert!(target.pointer_moved(Point::new(120.0, 130.0)));
        assert!(matches!(target.transform(), Transform::Tilt(tilt) if tilt != Tilt::NEUTRAL));
        assert!(target.spotlight().is_some());

        assert!(target.pointer_left());
        assert!(!target.is_hovered());
        assert_eq!(target.transform(), Transform::Tilt(Tilt::NEUTRAL));
        assert_eq!(target.spotlight(), None);
        assert_eq!(target.displayed_quad(), card().corners());
    }

    #[test]
    fn leaving_untouched_target_reports_no_change() {
        let mut target = HoverTarget::new(card(), HoverKind::Tilt(TiltSettings::default()));
        assert!(!target.pointer_left());
        assert_eq!(target.transform(), Transform::Tilt(Tilt::NEUTRAL));
    }

    fn edge_heights(quad: [Point; 4]) -> (f32, f32) {
        (quad[3].y - quad[0].y, quad[2].y - quad[1].y)
    }

    #[test]
    fn tilted_card_leans_toward_the_pointer_side() {
        let pointer = Point::new(110.0, 200.0);
        let mut near = HoverTarget::new(card(), HoverKind::Tilt(TiltSettings::default()));
        near.pointer_moved(pointer);
        let (left, right) = edge_heights(near.displayed_quad());
        // pointer on the left edge lifts that edge toward the viewer
        assert!(left > right);

        let far_settings = TiltSettings {
            perspective: 10_000.0,
            ..TiltSettings::default()
        };
        let mut far = HoverTarget::new(card(), HoverKind::Tilt(far_settings));
        far.pointer_moved(pointer);
        let (far_left, far_right) = edge_heights(far.displayed_quad());
        assert!(far_left - far_right < left - right);
    }

    #[test]
    fn spotlight_follows_pointer_on_flat_card() {
        let settings = TiltSettings {
            divisor: f32::INFINITY,
            hover_scale: 1.0,
            ..TiltSettings::default()
        };
        let mut target = HoverTarget::new(card(), HoverKind::Tilt(settings));
        target.pointer_moved(Point::new(175.0, 150.0));
        let spot = target.spotlight().unwrap();
        assert!((spot.x - 175.0).abs() < 1e-3);
        assert!((spot.y - 150.0).abs() < 1e-3);
    }
}
