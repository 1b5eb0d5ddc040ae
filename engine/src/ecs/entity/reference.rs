use std::{any::type_name, fmt, rc::Rc};

use crate::ecs::{
    component::{Component, Info, Shape},
    entity::Entity,
    storage::{Column, Row, Table},
};

/// A handle to one entity's row in its table.
///
/// References borrow the simulation's storage, so nothing can move or remove the entity while a
/// reference is alive. Refs yielded by a query share one [`View`] per table; a component the query
/// borrows mutably cannot also be read through the reference.
///
/// # Example
///
/// ```rust,ignore
/// for (entity, position) in sim.execute::<&mut Position>()? {
///     if let Some(velocity) = entity.get::<Velocity>() {
///         position.x += velocity.dx;
///     }
/// }
/// ```
#[derive(Clone)]
pub struct Ref<'w> {
    /// The referenced entity.
    entity: Entity,

    /// The entity's row in the viewed table.
    row: Row,

    /// The table columns readable through this reference.
    view: Rc<View<'w>>,
}

impl<'w> Ref<'w> {
    /// Construct a reference to `entity` at `row` of `view`.
    #[inline]
    pub(crate) fn new(entity: Entity, row: Row, view: Rc<View<'w>>) -> Self {
        Self { entity, row, view }
    }

    /// Construct a reference that can read every component of the entity at `row` in `table`.
    pub(crate) fn of(table: &'w Table, entity: Entity, row: Row) -> Self {
        Self::new(entity, row, Rc::new(View::of(table)))
    }

    /// Get the referenced entity.
    #[inline]
    pub fn id(&self) -> Entity {
        self.entity
    }

    /// Get the shape of the referenced entity.
    #[inline]
    pub fn shape(&self) -> &'w Shape {
        self.view.shape
    }

    /// Determine if the entity has a component of type `C`.
    pub fn has<C: Component>(&self) -> bool {
        self.view.column::<C>().is_some() || self.view.is_borrowed::<C>()
    }

    /// Get the entity's component of type `C`, if it has one.
    ///
    /// # Panics
    /// Panics if `C` is borrowed mutably by the query that produced this reference.
    pub fn get<C: Component>(&self) -> Option<&'w C> {
        match self.view.column::<C>() {
            Some(column) => column.get::<C>(self.row),
            None if self.view.is_borrowed::<C>() => panic!(
                "{} is borrowed mutably by the running query",
                type_name::<C>()
            ),
            None => None,
        }
    }
}

impl fmt::Debug for Ref<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("entity", &self.entity)
            .field("shape", &self.view.shape.ids())
            .finish()
    }
}

/// The readable columns of one table.
pub(crate) struct View<'w> {
    /// The table's shape.
    shape: &'w Shape,

    /// Columns that may be read.
    shared: Vec<&'w Column>,

    /// Components held exclusively by a running query.
    borrowed: Vec<Info>,
}

impl<'w> View<'w> {
    #[inline]
    pub(crate) fn new(shape: &'w Shape, shared: Vec<&'w Column>, borrowed: Vec<Info>) -> Self {
        Self {
            shape,
            shared,
            borrowed,
        }
    }

    /// A view that can read every column of `table`.
    pub(crate) fn of(table: &'w Table) -> Self {
        Self::new(table.shape(), table.columns().iter().collect(), Vec::new())
    }

    fn column<C: Component>(&self) -> Option<&'w Column> {
        self.shared
            .iter()
            .copied()
            .find(|column| column.info().is::<C>())
    }

    fn is_borrowed<C: Component>(&self) -> bool {
        self.borrowed.iter().any(Info::is::<C>)
    }
}
