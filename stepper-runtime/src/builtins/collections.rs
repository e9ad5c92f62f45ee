// stepper-runtime - Collection built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Constructors and associative operations on lists, vectors, maps and sets.

use stepper_parser::{Expr, OrdMap, Vector};

use super::{Builtin, require_index, seq_items};
use crate::error::{Error, Result, check_arity};

pub(super) const BUILTINS: &[(&str, Builtin)] = &[
    ("list", builtin_list),
    ("vector", builtin_vector),
    ("vec", builtin_vec),
    ("hash-map", builtin_hash_map),
    ("hash-set", builtin_hash_set),
    ("set", builtin_set),
    ("get", builtin_get),
    ("get-in", builtin_get_in),
    ("assoc", builtin_assoc),
    ("dissoc", builtin_dissoc),
    ("conj", builtin_conj),
    ("contains?", builtin_contains_p),
    ("keys", builtin_keys),
    ("vals", builtin_vals),
    ("count", builtin_count),
    ("merge", builtin_merge),
    ("zipmap", builtin_zipmap),
];

// ============================================================================
// Constructors
// ============================================================================

pub(crate) fn builtin_list(args: &[Expr]) -> Result<Expr> {
    Ok(Expr::list(args.to_vec()))
}

pub(crate) fn builtin_vector(args: &[Expr]) -> Result<Expr> {
    Ok(Expr::vector(args.to_vec()))
}

pub(crate) fn builtin_vec(args: &[Expr]) -> Result<Expr> {
    check_arity("vec", args, 1)?;
    Ok(Expr::vector(seq_items(&args[0], "vec")?))
}

pub(crate) fn builtin_hash_map(args: &[Expr]) -> Result<Expr> {
    if args.len() % 2 != 0 {
        return Err(Error::Eval(format!(
            "hash-map: no value supplied for key: {}",
            args[args.len() - 1]
        )));
    }
    Ok(Expr::map(
        args.chunks(2)
            .map(|kv| (kv[0].clone(), kv[1].clone()))
            .collect(),
    ))
}

pub(crate) fn builtin_hash_set(args: &[Expr]) -> Result<Expr> {
    Ok(Expr::set(args.to_vec()))
}

pub(crate) fn builtin_set(args: &[Expr]) -> Result<Expr> {
    check_arity("set", args, 1)?;
    Ok(Expr::set(seq_items(&args[0], "set")?))
}

// ============================================================================
// Lookup
// ============================================================================

/// Lookup by key in a map, member in a set, or index in a vector or string.
fn lookup(coll: &Expr, key: &Expr) -> Option<Expr> {
    match (coll, key) {
        (Expr::Map(map), _) => map.get(key).cloned(),
        (Expr::Set(set), _) => set.contains(key).then(|| key.clone()),
        (Expr::Vector(items), Expr::Int(i)) => {
            usize::try_from(*i).ok().and_then(|i| items.get(i).cloned())
        }
        (Expr::String(s), Expr::Int(i)) => usize::try_from(*i)
            .ok()
            .and_then(|i| s.chars().nth(i))
            .map(Expr::Char),
        _ => None,
    }
}

/// (get coll key default?)
pub(crate) fn builtin_get(args: &[Expr]) -> Result<Expr> {
    let (coll, key, default) = match args {
        [coll, key] => (coll, key, Expr::Nil),
        [coll, key, default] => (coll, key, default.clone()),
        _ => return Err(Error::arity_range("get", 2, 3, args.len())),
    };
    Ok(lookup(coll, key).unwrap_or(default))
}

/// (get-in coll [keys] default?)
pub(crate) fn builtin_get_in(args: &[Expr]) -> Result<Expr> {
    let (coll, path, default) = match args {
        [coll, path] => (coll, path, Expr::Nil),
        [coll, path, default] => (coll, path, default.clone()),
        _ => return Err(Error::arity_range("get-in", 2, 3, args.len())),
    };
    let mut current = coll.clone();
    for key in seq_items(path, "get-in")? {
        match lookup(&current, &key) {
            Some(next) => current = next,
            None => return Ok(default),
        }
    }
    Ok(current)
}

pub(crate) fn builtin_contains_p(args: &[Expr]) -> Result<Expr> {
    check_arity("contains?", args, 2)?;
    let found = match (&args[0], &args[1]) {
        (Expr::Map(map), key) => map.contains_key(key),
        (Expr::Set(set), key) => set.contains(key),
        (Expr::Vector(items), Expr::Int(i)) => usize::try_from(*i).is_ok_and(|i| i < items.len()),
        (Expr::Nil, _) => false,
        (other, _) => {
            return Err(Error::type_error_in(
                "contains?",
                "associative collection",
                other.type_name(),
            ));
        }
    };
    Ok(Expr::Bool(found))
}

// ============================================================================
// Update
// ============================================================================

/// (assoc coll k v & kvs) on maps, vectors and nil
pub(crate) fn builtin_assoc(args: &[Expr]) -> Result<Expr> {
    let Some((coll, kvs)) = args.split_first() else {
        return Err(Error::arity_at_least("assoc", 3, 0));
    };
    if kvs.is_empty() || kvs.len() % 2 != 0 {
        return Err(Error::Eval(
            "assoc expects a collection followed by key/value pairs".into(),
        ));
    }
    match coll {
        Expr::Map(_) | Expr::Nil => {
            let mut map = match coll {
                Expr::Map(map) => map.clone(),
                _ => OrdMap::new(),
            };
            for kv in kvs.chunks(2) {
                map.insert(kv[0].clone(), kv[1].clone());
            }
            Ok(Expr::Map(map))
        }
        Expr::Vector(items) => {
            let mut items = items.clone();
            for kv in kvs.chunks(2) {
                let index = require_index(&kv[0], "assoc")?;
                if index < items.len() {
                    items.set(index, kv[1].clone());
                } else if index == items.len() {
                    items.push_back(kv[1].clone());
                } else {
                    return Err(Error::Eval(format!(
                        "assoc: index {} out of bounds for vector of length {}",
                        index,
                        items.len()
                    )));
                }
            }
            Ok(Expr::Vector(items))
        }
        other => Err(Error::type_error_in("assoc", "map or vector", other.type_name())),
    }
}

pub(crate) fn builtin_dissoc(args: &[Expr]) -> Result<Expr> {
    let Some((coll, keys)) = args.split_first() else {
        return Err(Error::arity_at_least("dissoc", 1, 0));
    };
    match coll {
        Expr::Map(map) => {
            let mut map = map.clone();
            for key in keys {
                map.remove(key);
            }
            Ok(Expr::Map(map))
        }
        Expr::Nil => Ok(Expr::Nil),
        other => Err(Error::type_error_in("dissoc", "map", other.type_name())),
    }
}

/// (conj coll x*) - lists grow at the front, other collections at the back
pub(crate) fn builtin_conj(args: &[Expr]) -> Result<Expr> {
    let Some((coll, items)) = args.split_first() else {
        return Ok(Expr::vector(Vec::new()));
    };
    match coll {
        Expr::Nil => {
            let mut list = Vector::new();
            for item in items {
                list.push_front(item.clone());
            }
            Ok(Expr::List(list))
        }
        Expr::List(list) => {
            let mut list = list.clone();
            for item in items {
                list.push_front(item.clone());
            }
            Ok(Expr::List(list))
        }
        Expr::Vector(vector) => {
            let mut vector = vector.clone();
            vector.extend(items.iter().cloned());
            Ok(Expr::Vector(vector))
        }
        Expr::Set(set) => {
            let mut set = set.clone();
            for item in items {
                set.insert(item.clone());
            }
            Ok(Expr::Set(set))
        }
        Expr::Map(map) => {
            let mut map = map.clone();
            for item in items {
                match item {
                    Expr::Vector(entry) if entry.len() == 2 => {
                        map.insert(entry[0].clone(), entry[1].clone());
                    }
                    Expr::Map(other) => map.extend(other.clone()),
                    other => {
                        return Err(Error::type_error_in(
                            "conj",
                            "map entry",
                            other.type_name(),
                        ));
                    }
                }
            }
            Ok(Expr::Map(map))
        }
        other => Err(Error::type_error_in("conj", "collection", other.type_name())),
    }
}

pub(crate) fn builtin_merge(args: &[Expr]) -> Result<Expr> {
    let mut result: Option<OrdMap<Expr, Expr>> = None;
    for arg in args {
        match arg {
            Expr::Map(map) => {
                result = Some(match result {
                    Some(acc) => map.clone().union(acc),
                    None => map.clone(),
                });
            }
            Expr::Nil => {}
            other => return Err(Error::type_error_in("merge", "map", other.type_name())),
        }
    }
    Ok(result.map_or(Expr::Nil, Expr::Map))
}

pub(crate) fn builtin_zipmap(args: &[Expr]) -> Result<Expr> {
    check_arity("zipmap", args, 2)?;
    let keys = seq_items(&args[0], "zipmap")?;
    let vals = seq_items(&args[1], "zipmap")?;
    Ok(Expr::map(keys.into_iter().zip(vals).collect()))
}

// ============================================================================
// Inspection
// ============================================================================

fn map_part(name: &str, args: &[Expr], key: bool) -> Result<Expr> {
    check_arity(name, args, 1)?;
    match &args[0] {
        Expr::Map(map) if map.is_empty() => Ok(Expr::Nil),
        Expr::Map(map) => Ok(Expr::list(
            map.iter()
                .map(|(k, v)| if key { k.clone() } else { v.clone() })
                .collect(),
        )),
        Expr::Nil => Ok(Expr::Nil),
        other => Err(Error::type_error_in(name.to_string(), "map", other.type_name())),
    }
}

pub(crate) fn builtin_keys(args: &[Expr]) -> Result<Expr> {
    map_part("keys", args, true)
}

pub(crate) fn builtin_vals(args: &[Expr]) -> Result<Expr> {
    map_part("vals", args, false)
}

pub(crate) fn builtin_count(args: &[Expr]) -> Result<Expr> {
    check_arity("count", args, 1)?;
    let n = match &args[0] {
        Expr::Nil => 0,
        Expr::List(items) | Expr::Vector(items) => items.len(),
        Expr::Map(map) => map.len(),
        Expr::Set(set) => set.len(),
        Expr::String(s) => s.chars().count(),
        other => return Err(Error::type_error_in("count", "collection", other.type_name())),
    };
    i64::try_from(n)
        .map(Expr::Int)
        .map_err(|_| Error::Eval("count: collection too large".into()))
}
