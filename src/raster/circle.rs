//! Integer midpoint circles, outline and filled

use super::{Pen, GUARD_BAND};

/// Walk one octant of a circle of `radius` starting at (radius, 0) and hand
/// every step's (x, y) offset to `visit`. The decision term `d` tracks the
/// error of the current point; whenever it goes negative x is restored
/// instead of stepping inward.
fn walk_octant(radius: i32, mut visit: impl FnMut(i32, i32)) {
    let mut x = radius;
    let mut y = 0;
    let mut d = 0;

    while x > y {
        x -= 1;
        y += 1;
        d -= x - y;
        if d < 0 {
            d += x;
            x += 1;
        }
        visit(x, y);
    }
}

/// Center and radius pulled into the guard band so every offset fits `i32`
fn guarded(cx: i32, cy: i32, radius: i32) -> (i32, i32, i32) {
    (
        cx.clamp(-GUARD_BAND, GUARD_BAND),
        cy.clamp(-GUARD_BAND, GUARD_BAND),
        radius.clamp(0, GUARD_BAND),
    )
}

/// Circle outline: the four axis points, then all eight symmetric pixels
/// per octant step
pub fn outline(pen: &mut Pen, cx: i32, cy: i32, radius: i32, z: f32) {
    let (cx, cy, radius) = guarded(cx, cy, radius);
    pen.plot(cx - radius, cy, z);
    pen.plot(cx + radius, cy, z);
    pen.plot(cx, cy - radius, z);
    pen.plot(cx, cy + radius, z);

    walk_octant(radius, |x, y| {
        pen.plot(cx - x, cy - y, z);
        pen.plot(cx - y, cy - x, z);
        pen.plot(cx + y, cy - x, z);
        pen.plot(cx + x, cy - y, z);

        pen.plot(cx - x, cy + y, z);
        pen.plot(cx - y, cy + x, z);
        pen.plot(cx + y, cy + x, z);
        pen.plot(cx + x, cy + y, z);
    });
}

/// Filled circle: horizontal spans between each symmetric pair
pub fn filled(pen: &mut Pen, cx: i32, cy: i32, radius: i32, z: f32) {
    let (cx, cy, radius) = guarded(cx, cy, radius);
    pen.span(cx - radius, cx + radius, cy, z, z);

    walk_octant(radius, |x, y| {
        pen.span(cx - x, cx + x, cy - y, z, z);
        pen.span(cx - y, cx + y, cy + x, z, z);
        pen.span(cx - x, cx + x, cy + y, z, z);
        pen.span(cx - y, cx + y, cy - x, z, z);
    });
}
