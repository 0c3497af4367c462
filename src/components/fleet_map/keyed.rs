//! Keyed collections of visual element descriptors, reconciled against fresh data by key.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Stable identity of a drawn element. Survives updates, never reused within a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

#[derive(Clone, Debug)]
pub struct Element<K, E> {
	pub id: ElementId,
	pub key: K,
	pub attrs: E,
}

/// Outcome of one reconciliation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JoinSummary {
	pub entered: usize,
	pub updated: usize,
	pub exited: usize,
	/// Records dropped because an earlier record carried the same key.
	pub duplicates: usize,
}

#[derive(Clone, Debug)]
pub struct KeyedLayer<K, E> {
	elements: Vec<Element<K, E>>,
	next_id: u64,
}

impl<K, E> Default for KeyedLayer<K, E> {
	fn default() -> Self {
		Self {
			elements: Vec::new(),
			next_id: 0,
		}
	}
}

impl<K: Clone + Eq + Hash, E> KeyedLayer<K, E> {
	/// Reconcile the layer with `data`: elements whose key reappears are updated in place and
	/// keep their id, new keys enter, missing keys exit. The resulting order follows `data`.
	/// Exited elements are returned so callers can release anything attached to them.
	pub fn join<D>(
		&mut self,
		data: &[D],
		key: impl Fn(&D) -> K,
		mut enter: impl FnMut(&D) -> E,
		mut update: impl FnMut(&D, &mut E),
	) -> (JoinSummary, Vec<Element<K, E>>) {
		let mut previous: HashMap<K, Element<K, E>> = self
			.elements
			.drain(..)
			.map(|el| (el.key.clone(), el))
			.collect();
		let mut summary = JoinSummary::default();
		let mut seen = HashSet::with_capacity(data.len());

		for datum in data {
			let k = key(datum);
			if !seen.insert(k.clone()) {
				summary.duplicates += 1;
				continue;
			}
			match previous.remove(&k) {
				Some(mut el) => {
					update(datum, &mut el.attrs);
					summary.updated += 1;
					self.elements.push(el);
				}
				None => {
					let id = ElementId(self.next_id);
					self.next_id += 1;
					summary.entered += 1;
					self.elements.push(Element {
						id,
						key: k,
						attrs: enter(datum),
					});
				}
			}
		}

		let mut exited: Vec<_> = previous.into_values().collect();
		exited.sort_by_key(|el| el.id);
		summary.exited = exited.len();
		(summary, exited)
	}

	/// Remove every element, returning them.
	pub fn clear(&mut self) -> Vec<Element<K, E>> {
		std::mem::take(&mut self.elements)
	}

	pub fn get(&self, key: &K) -> Option<&Element<K, E>> {
		self.elements.iter().find(|el| &el.key == key)
	}
}

impl<K, E> KeyedLayer<K, E> {
	pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Element<K, E>> {
		self.elements.iter()
	}

	pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Element<K, E>> {
		self.elements.iter_mut()
	}

	pub fn len(&self) -> usize {
		self.elements.len()
	}
}
