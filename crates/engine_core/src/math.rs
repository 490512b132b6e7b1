//! Small numeric helpers shared by the flight model and the AI.
//!
//! Everything here is total: degenerate inputs (zero vectors, out-of-domain
//! trig arguments) produce a finite fallback instead of NaN.

use glam::{Mat3, Quat, Vec3};

/// Angle in radians between two directions. Inputs need not be normalized.
///
/// Returns 0 if either vector is zero. The cosine is clamped to [-1, 1]
/// before `acos` so rounding overshoot never yields NaN.
pub fn angle_between(a: Vec3, b: Vec3) -> f32 {
    let a = a.normalize_or_zero();
    let b = b.normalize_or_zero();
    if a == Vec3::ZERO || b == Vec3::ZERO {
        return 0.0;
    }
    a.dot(b).clamp(-1.0, 1.0).acos()
}

/// Linearly remap `value` from `[in_min, in_max]` to `[out_min, out_max]`, clamped.
pub fn map_range_clamped(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    let span = in_max - in_min;
    if span.abs() <= f32::EPSILON {
        return if value >= in_max { out_max } else { out_min };
    }
    let t = ((value - in_min) / span).clamp(0.0, 1.0);
    out_min + (out_max - out_min) * t
}

/// Exponential-style approach of `current` toward `target`.
///
/// Moves by `(target - current) * clamp(dt * speed, 0, 1)`. A non-positive
/// speed snaps straight to the target.
pub fn interp_to(current: f32, target: f32, dt: f32, speed: f32) -> f32 {
    if speed <= 0.0 {
        return target;
    }
    let dist = target - current;
    if dist * dist < 1.0e-8 {
        return target;
    }
    current + dist * (dt * speed).clamp(0.0, 1.0)
}

/// Rotation whose forward (-Z) axis points along `direction` with `up` as the roll reference.
///
/// Falls back to a shortest-arc rotation when `direction` is parallel to `up`,
/// and to identity when `direction` is zero.
pub fn look_rotation(direction: Vec3, up: Vec3) -> Quat {
    let forward = direction.normalize_or_zero();
    if forward == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let right = forward.cross(up).normalize_or_zero();
    if right == Vec3::ZERO {
        return Quat::from_rotation_arc(Vec3::NEG_Z, forward);
    }
    let true_up = right.cross(forward);
    Quat::from_mat3(&Mat3::from_cols(right, true_up, -forward)).normalize()
}

/// Rotate `from` toward `to` by at most `max_angle` radians.
pub fn rotate_towards(from: Quat, to: Quat, max_angle: f32) -> Quat {
    let angle = from.angle_between(to);
    if angle <= max_angle.max(0.0) || angle <= f32::EPSILON {
        return to;
    }
    from.slerp(to, max_angle.max(0.0) / angle).normalize()
}
