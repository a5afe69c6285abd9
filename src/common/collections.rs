pub use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
