use std::any::{Any, type_name};

use fixedbitset::FixedBitSet;

use crate::ecs::{
    component::{BoxedValue, Component, Info},
    storage::Row,
};

/// A single component column in a table.
///
/// The column owns one slot per table row. Slots are `None` for tombstoned rows and are removed
/// when the table is pruned. The concrete element type is hidden behind [`ColumnData`] so a table
/// can hold heterogeneous columns side by side; typed access downcasts back to the component
/// type, which is always correct for columns built from the registry's [`Info`].
pub struct Column {
    /// The component this column stores.
    info: Info,

    /// Type-erased slot storage.
    data: Box<dyn ColumnData>,
}

impl Column {
    /// Create an empty column for component type `C`.
    pub fn new<C: Component>(info: Info, capacity: usize) -> Self {
        debug_assert!(info.is::<C>(), "column info does not describe {}", type_name::<C>());
        Self {
            info,
            data: Box::new(Typed::<C>(Vec::with_capacity(capacity))),
        }
    }

    /// Get the component info for this column.
    #[inline]
    pub fn info(&self) -> Info {
        self.info
    }

    /// Get the number of slots, including tombstoned ones.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if this column has no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reserve room for `additional` rows.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional);
    }

    /// Get the column's slots as a typed slice.
    ///
    /// # Panics
    /// Panics if `C` is not the column's component type.
    pub fn values<C: Component>(&self) -> &[Option<C>] {
        match self.data.as_any().downcast_ref::<Typed<C>>() {
            Some(typed) => &typed.0,
            None => mismatch::<C>(self.info),
        }
    }

    /// Get the column's slots as a mutable typed slice.
    ///
    /// # Panics
    /// Panics if `C` is not the column's component type.
    pub fn values_mut<C: Component>(&mut self) -> &mut [Option<C>] {
        let info = self.info;
        match self.data.as_any_mut().downcast_mut::<Typed<C>>() {
            Some(typed) => &mut typed.0,
            None => mismatch::<C>(info),
        }
    }

    /// Get the value stored at `row`, if the row is live.
    #[inline]
    pub fn get<C: Component>(&self, row: Row) -> Option<&C> {
        self.values::<C>().get(row.index())?.as_ref()
    }

    /// Get the value stored at `row` mutably, if the row is live.
    #[inline]
    pub fn get_mut<C: Component>(&mut self, row: Row) -> Option<&mut C> {
        self.values_mut::<C>().get_mut(row.index())?.as_mut()
    }

    /// Write a type-erased value at `row`. Writing one past the end appends a slot, any other row
    /// overwrites the existing slot.
    ///
    /// # Panics
    /// Panics if the value is not the column's component type or `row` is beyond the end.
    pub fn write_boxed(&mut self, row: Row, value: BoxedValue) {
        self.data.write_boxed(row, value, self.info);
    }

    /// Write a value at `row` with the same append/overwrite rules as [`Column::write_boxed`].
    pub fn write<C: Component>(&mut self, row: Row, value: C) {
        let info = self.info;
        match self.data.as_any_mut().downcast_mut::<Typed<C>>() {
            Some(typed) => typed.put(row, value),
            None => mismatch::<C>(info),
        }
    }

    /// Take the value out of `row`, leaving a tombstone slot.
    #[inline]
    pub fn take_boxed(&mut self, row: Row) -> Option<BoxedValue> {
        self.data.take_boxed(row)
    }

    /// Drop every slot whose bit is not set in `live`, keeping the order of survivors.
    #[inline]
    pub fn compact(&mut self, live: &FixedBitSet) {
        self.data.compact(live);
    }
}

fn mismatch<C: Component>(info: Info) -> ! {
    panic!("column for {} cannot hold {}", info.name(), type_name::<C>())
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("component", &self.info.name())
            .field("len", &self.len())
            .finish()
    }
}

/// Type-erased operations a table needs from a column without knowing its element type.
trait ColumnData: Send + Sync {
    fn len(&self) -> usize;

    fn reserve(&mut self, additional: usize);

    fn write_boxed(&mut self, row: Row, value: BoxedValue, info: Info);

    fn take_boxed(&mut self, row: Row) -> Option<BoxedValue>;

    fn compact(&mut self, live: &FixedBitSet);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// The concrete slot storage for component type `C`.
struct Typed<C>(Vec<Option<C>>);

impl<C: Component> Typed<C> {
    fn put(&mut self, row: Row, value: C) {
        let index = row.index();
        if index == self.0.len() {
            self.0.push(Some(value));
        } else {
            assert!(
                index < self.0.len(),
                "row {} is beyond the end of the {} column",
                index,
                type_name::<C>()
            );
            self.0[index] = Some(value);
        }
    }
}

impl<C: Component> ColumnData for Typed<C> {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn reserve(&mut self, additional: usize) {
        self.0.reserve(additional);
    }

    fn write_boxed(&mut self, row: Row, value: BoxedValue, info: Info) {
        match value.downcast::<C>() {
            Ok(value) => self.put(row, *value),
            Err(_) => panic!("value written to the {} column is not a {}", info.name(), type_name::<C>()),
        }
    }

    fn take_boxed(&mut self, row: Row) -> Option<BoxedValue> {
        let value = self.0.get_mut(row.index())?.take()?;
        Some(Box::new(value))
    }

    fn compact(&mut self, live: &FixedBitSet) {
        let mut index = 0;
        self.0.retain(|_| {
            let keep = live.contains(index);
            index += 1;
            keep
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
