//! Storage layouts for per-agent fields.
//!
//! A [`Backend`] decides how one field of a cell is physically held.  Every
//! layout hands out the same [`Accessor`] interface, `get(idx)` and
//! `get_mut(idx)` in O(1), so geometry and division code is written once and
//! behaves identically whichever layout it runs on.
//!
//! | Backend          | Column type           | Use                                    |
//! |------------------|-----------------------|----------------------------------------|
//! | [`Scalar`]       | [`Single<T>`]         | a free-standing cell (`Cell<X>`)       |
//! | [`Soa`]          | `Vec<T>`              | the simulation's columnar store        |
//! | [`SoaSlice<'a>`] | `&'a mut [T]`         | a worker's window over part of a store |
//!
//! Index validity is the owner's duty: every column of one store is resized
//! in lockstep, so the accessors only `debug_assert!` bounds.

use std::marker::PhantomData;

/// Bound shared by every storable field type.
pub trait Field: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Field for T {}

/// Uniform per-field access, independent of layout.
pub trait Accessor<T> {
    fn get(&self, idx: usize) -> &T;
    fn get_mut(&mut self, idx: usize) -> &mut T;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A storage layout: maps a field type to the column that holds it.
pub trait Backend: Sized {
    type Column<T: Field>: Accessor<T>;

    /// Human-readable layout name for logs and errors.
    const NAME: &'static str;
}

// ── Scalar ────────────────────────────────────────────────────────────────────

/// One value per field: the layout of an individual cell.
#[derive(Copy, Clone, Debug, Default)]
pub struct Scalar;

/// The column of a [`Scalar`] layout; holds exactly one value at index 0.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Single<T>(pub T);

impl<T> Accessor<T> for Single<T> {
    #[inline(always)]
    fn get(&self, idx: usize) -> &T {
        debug_assert_eq!(idx, 0, "scalar column indexed at {idx}");
        &self.0
    }

    #[inline(always)]
    fn get_mut(&mut self, idx: usize) -> &mut T {
        debug_assert_eq!(idx, 0, "scalar column indexed at {idx}");
        &mut self.0
    }

    #[inline(always)]
    fn len(&self) -> usize {
        1
    }
}

impl Backend for Scalar {
    type Column<T: Field> = Single<T>;
    const NAME: &'static str = "scalar";
}

// ── Soa ───────────────────────────────────────────────────────────────────────

/// One `Vec` per field, indexed by `AgentId`.
#[derive(Copy, Clone, Debug, Default)]
pub struct Soa;

impl<T> Accessor<T> for Vec<T> {
    #[inline(always)]
    fn get(&self, idx: usize) -> &T {
        debug_assert!(idx < self.len());
        &self[idx]
    }

    #[inline(always)]
    fn get_mut(&mut self, idx: usize) -> &mut T {
        debug_assert!(idx < self.len());
        &mut self[idx]
    }

    #[inline(always)]
    fn len(&self) -> usize {
        Vec::len(self)
    }
}

impl Backend for Soa {
    type Column<T: Field> = Vec<T>;
    const NAME: &'static str = "soa";
}

// ── SoaSlice ──────────────────────────────────────────────────────────────────

/// A mutable window over a contiguous index range of an [`Soa`] store.
///
/// Windows over disjoint ranges can be handed to different worker threads.
#[derive(Copy, Clone, Debug, Default)]
pub struct SoaSlice<'a>(PhantomData<&'a mut ()>);

impl<T> Accessor<T> for &mut [T] {
    #[inline(always)]
    fn get(&self, idx: usize) -> &T {
        debug_assert!(idx < <[T]>::len(self));
        &self[idx]
    }

    #[inline(always)]
    fn get_mut(&mut self, idx: usize) -> &mut T {
        debug_assert!(idx < <[T]>::len(self));
        &mut self[idx]
    }

    #[inline(always)]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }
}

impl<'a> Backend for SoaSlice<'a> {
    type Column<T: Field> = &'a mut [T];
    const NAME: &'static str = "soa-slice";
}
