use log::debug;

use crate::error::{QuadtreeError, Result};
use crate::spatial::quadtree::point_quadtree::{checked_point, Leaf, Quadtree};
use crate::spatial::quadtree::prelude::*;

/// Payloads that know where they belong in the tree.
pub trait Positioned {
    fn position(&self) -> Vec2;
}

impl Positioned for Vec2 {
    fn position(&self) -> Vec2 {
        *self
    }
}

impl Positioned for [f64; 2] {
    fn position(&self) -> Vec2 {
        Vec2::new(self[0], self[1])
    }
}

impl Positioned for (f64, f64) {
    fn position(&self) -> Vec2 {
        Vec2::new(self.0, self.1)
    }
}

impl<P> Quadtree<P> {
    /// Adds every datum at the position it reports.
    pub fn add_all_data<I>(&mut self, data: I) -> Result<&mut Self>
        where I: IntoIterator<Item = P>,
              P: Positioned
    {
        let data: Vec<P> = data.into_iter().collect();
        let points = data.iter()
            .map(|d| {
                let p = d.position();
                checked_point(p.x, p.y)
            })
            .collect::<Result<Vec<_>>>()?;

        self.load(points, data)?;
        Ok(self)
    }

    /// Adds the points (xs[i], ys[i]), using each point itself as its payload unless 'data' is
    /// given.
    ///
    /// The extent is grown to the bounding box of the whole batch before anything is inserted.
    /// Either every point is inserted or, on error, none of them are.
    pub fn add_all(&mut self, xs: &[f64], ys: &[f64], data: Option<Vec<P>>) -> Result<&mut Self>
        where P: From<Vec2>
    {
        match data {
            Some(data) => self.add_all_with(xs, ys, data),
            None => {
                let points = zip_points(xs, ys)?;
                let data = points.iter().map(|p| P::from(*p)).collect();
                self.load(points, data)?;
                Ok(self)
            }
        }
    }

    /// Adds the points (xs[i], ys[i]) with data[i] as their payloads.
    pub fn add_all_with(&mut self, xs: &[f64], ys: &[f64], data: Vec<P>) -> Result<&mut Self> {
        let points = zip_points(xs, ys)?;
        if data.len() != points.len() {
            return Err(QuadtreeError::InvalidInput(
                format!("got {} points but {} payloads", points.len(), data.len())
            ));
        }

        self.load(points, data)?;
        Ok(self)
    }

    /// Covers the bounding box of 'points', then inserts each one in order.
    ///
    /// Every point must already be finite and 'data' must be as long as 'points'.
    fn load(&mut self, points: Vec<Vec2>, data: Vec<P>) -> Result<()> {
        let Some(first) = points.first() else {
            return Ok(());
        };

        let (min, max) = points.iter().fold((*first, *first), |(min, max), p| {
            (min.inf(p), max.sup(p))
        });

        debug!("loading {} points within {:?}..{:?}", points.len(), min.as_slice(), max.as_slice());

        let bbox = self.cover_corners(&min, &max)?;

        for (point, datum) in points.into_iter().zip(data) {
            self.insert(bbox, Leaf::new(point, datum));
        }

        Ok(())
    }
}

fn zip_points(xs: &[f64], ys: &[f64]) -> Result<Vec<Vec2>> {
    if xs.len() != ys.len() {
        return Err(QuadtreeError::InvalidInput(
            format!("got {} x-coordinates but {} y-coordinates", xs.len(), ys.len())
        ));
    }

    xs.iter().zip(ys)
        .map(|(&x, &y)| checked_point(x, y))
        .collect()
}
