use std::collections::{HashMap, HashSet};

use xxhash_rust::xxh3::Xxh3DefaultBuilder;

pub type Xxh3HashSet<K> = HashSet<K, Xxh3DefaultBuilder>;
pub type Xxh3HashMap<K, V> = HashMap<K, V, Xxh3DefaultBuilder>;
