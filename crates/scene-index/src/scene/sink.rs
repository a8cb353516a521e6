//! Output sinks for overlap queries.
//!
//! All overlap entry points share one candidate filtering and deduplication
//! routine; the sink only decides what to do with each accepted object and
//! whether the query should go on.

use std::ops::ControlFlow;

use crate::Obb;

use super::ObjectId;

/// Receives the objects accepted by an overlap query.
pub trait OverlapSink {
    /// Called once per accepted object with its world box.
    ///
    /// Returning `ControlFlow::Break` ends the query.
    fn visit(&mut self, id: ObjectId, obb: &Obb) -> ControlFlow<()>;
}

/// Stops at the first accepted object.
#[derive(Debug, Default)]
pub struct AnyOverlap {
    found: bool,
}

impl AnyOverlap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn found(&self) -> bool {
        self.found
    }
}

impl OverlapSink for AnyOverlap {
    fn visit(&mut self, _id: ObjectId, _obb: &Obb) -> ControlFlow<()> {
        self.found = true;
        ControlFlow::Break(())
    }
}

/// Collects the world boxes of accepted objects.
#[derive(Debug)]
pub struct ObbCollector<'a> {
    out: &'a mut Vec<Obb>,
}

impl<'a> ObbCollector<'a> {
    pub fn new(out: &'a mut Vec<Obb>) -> Self {
        Self { out }
    }
}

impl OverlapSink for ObbCollector<'_> {
    fn visit(&mut self, _id: ObjectId, obb: &Obb) -> ControlFlow<()> {
        self.out.push(*obb);
        ControlFlow::Continue(())
    }
}

/// Collects the ids of accepted objects.
#[derive(Debug)]
pub struct ObjectCollector<'a> {
    out: &'a mut Vec<ObjectId>,
}

impl<'a> ObjectCollector<'a> {
    pub fn new(out: &'a mut Vec<ObjectId>) -> Self {
        Self { out }
    }
}

impl OverlapSink for ObjectCollector<'_> {
    fn visit(&mut self, id: ObjectId, _obb: &Obb) -> ControlFlow<()> {
        self.out.push(id);
        ControlFlow::Continue(())
    }
}

/// A sink that calls a closure for each accepted object.
pub struct FnSink<F>
where
    F: FnMut(ObjectId, &Obb) -> ControlFlow<()>,
{
    func: F,
}

impl<F> FnSink<F>
where
    F: FnMut(ObjectId, &Obb) -> ControlFlow<()>,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> OverlapSink for FnSink<F>
where
    F: FnMut(ObjectId, &Obb) -> ControlFlow<()>,
{
    fn visit(&mut self, id: ObjectId, obb: &Obb) -> ControlFlow<()> {
        (self.func)(id, obb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, UnitQuaternion, Vector3};

    fn make_obb(x: f32) -> Obb {
        Obb::new(Point3::new(x, 0.0, 0.0), Vector3::repeat(1.0), UnitQuaternion::identity())
    }

    #[test]
    fn any_overlap_breaks_immediately() {
        let mut sink = AnyOverlap::new();
        assert!(!sink.found());
        assert!(sink.visit(ObjectId(1), &make_obb(0.0)).is_break());
        assert!(sink.found());
    }

    #[test]
    fn collectors_keep_going() {
        let mut obbs = Vec::new();
        let mut ids = Vec::new();
        {
            let mut obb_sink = ObbCollector::new(&mut obbs);
            let mut id_sink = ObjectCollector::new(&mut ids);
            for i in 0..3 {
                assert!(obb_sink.visit(ObjectId(i), &make_obb(i as f32)).is_continue());
                assert!(id_sink.visit(ObjectId(i), &make_obb(i as f32)).is_continue());
            }
        }
        assert_eq!(obbs.len(), 3);
        assert_eq!(obbs[2].center().x, 2.0);
        assert_eq!(ids, vec![ObjectId(0), ObjectId(1), ObjectId(2)]);
    }

    #[test]
    fn fn_sink_calls_closure() {
        let mut count = 0;
        {
            let mut sink = FnSink::new(|_, _: &Obb| {
                count += 1;
                if count == 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            });
            assert!(sink.visit(ObjectId(1), &make_obb(0.0)).is_continue());
            assert!(sink.visit(ObjectId(2), &make_obb(0.0)).is_break());
        }
        assert_eq!(count, 2);
    }
}
