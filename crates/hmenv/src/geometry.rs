//! Geometry transform: device state → momentum contribution in the body frame.
//!
//! Mounting layout
//! - Four slots around the body z-axis. Each slot has a fixed unit-direction
//!   formula in terms of the gimbal angle `δ` and the tilt `β`:
//!   - slot 1: `(-cβ·sδ,  cδ,    sβ·sδ)`
//!   - slot 2: `(-cδ,    -cβ·sδ, sβ·sδ)`
//!   - slot 3: `( cβ·sδ, -cδ,    sβ·sδ)`
//!   - slot 4: `( cδ,     cβ·sδ, sβ·sδ)`
//! - The adjacent pair occupies slots 1 and 4; the pyramid uses all four.
//! - Tilt `β` equals the skew for the conventional style and `90° − skew` for the
//!   Hanspeter style. `cos β`/`sin β` are computed once per `Mount`.

use nalgebra::Vector3;

use crate::config::ClusterStyle;

/// Gimbal angle (degrees) and rotor momentum of one device.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceState {
    pub angle_deg: f64,
    pub h: f64,
}

impl DeviceState {
    #[inline]
    pub fn new(angle_deg: f64, h: f64) -> Self {
        Self { angle_deg, h }
    }
}

/// Mounting position in the four-slot layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    One,
    Two,
    Three,
    Four,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::One, Slot::Two, Slot::Three, Slot::Four];
}

/// Precomputed tilt for one cluster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mount {
    tilt_deg: f64,
    cb: f64,
    sb: f64,
}

impl Mount {
    pub fn new(style: ClusterStyle, skew_deg: f64) -> Self {
        let tilt_deg = match style {
            ClusterStyle::Conventional => skew_deg,
            ClusterStyle::Hanspeter => 90.0 - skew_deg,
        };
        let (sb, cb) = tilt_deg.to_radians().sin_cos();
        Self { tilt_deg, cb, sb }
    }

    /// Effective tilt `β` in degrees.
    #[inline]
    pub fn tilt_deg(&self) -> f64 {
        self.tilt_deg
    }

    /// Unit momentum direction of a device in `slot` at gimbal angle `angle_deg`.
    #[inline]
    pub fn direction(&self, slot: Slot, angle_deg: f64) -> Vector3<f64> {
        let (s, c) = angle_deg.to_radians().sin_cos();
        let (cb, sb) = (self.cb, self.sb);
        match slot {
            Slot::One => Vector3::new(-cb * s, c, sb * s),
            Slot::Two => Vector3::new(-c, -cb * s, sb * s),
            Slot::Three => Vector3::new(cb * s, -c, sb * s),
            Slot::Four => Vector3::new(c, cb * s, sb * s),
        }
    }

    #[inline]
    pub fn contribution(&self, slot: Slot, state: DeviceState) -> Vector3<f64> {
        self.direction(slot, state.angle_deg) * state.h
    }

    /// Adjacent pair: devices in slots 1 and 4.
    #[inline]
    pub fn pair(&self, first: DeviceState, fourth: DeviceState) -> Vector3<f64> {
        self.contribution(Slot::One, first) + self.contribution(Slot::Four, fourth)
    }

    /// Four-slot pyramid, states ordered by slot.
    #[inline]
    pub fn quad(&self, states: [DeviceState; 4]) -> Vector3<f64> {
        self.contribution(Slot::One, states[0])
            + self.contribution(Slot::Two, states[1])
            + self.contribution(Slot::Three, states[2])
            + self.contribution(Slot::Four, states[3])
    }
}

/// Three orthogonal wheels: each magnitude lands on its own axis.
#[inline]
pub fn orthogonal(h: [f64; 3]) -> Vector3<f64> {
    Vector3::new(h[0], h[1], h[2])
}
