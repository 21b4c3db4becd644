//! `babelHelpers` runtime for syntax lowered by the transformer.
//!
//! Lowering async functions, object spread/rest and class fields calls
//! helpers as `babelHelpers.name(...)`. Only the helpers a bundle actually
//! references are emitted, together with the helpers they depend on.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static HELPER_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bbabelHelpers\.([A-Za-z0-9_$]+)").unwrap());

struct Helper {
    name: &'static str,
    requires: &'static [&'static str],
    body: &'static str,
}

const HELPERS: &[Helper] = &[
    Helper {
        name: "toPropertyKey",
        requires: &[],
        body: r#"function (t) {
    var i = t;
    if (typeof t === 'object' && t !== null) {
      var p = t[Symbol.toPrimitive];
      if (p !== undefined) {
        i = p.call(t, 'string');
        if (typeof i === 'object') throw new TypeError('@@toPrimitive must return a primitive value.');
      } else {
        i = String(t);
      }
    }
    return typeof i === 'symbol' ? i : String(i);
  }"#,
    },
    Helper {
        name: "defineProperty",
        requires: &["toPropertyKey"],
        body: r#"function (e, r, t) {
    r = babelHelpers.toPropertyKey(r);
    if (r in e) {
      Object.defineProperty(e, r, { value: t, enumerable: true, configurable: true, writable: true });
    } else {
      e[r] = t;
    }
    return e;
  }"#,
    },
    Helper {
        name: "objectSpread2",
        requires: &["defineProperty"],
        body: r#"function (e) {
    function ownKeys(o, r) {
      var k = Object.keys(o);
      if (Object.getOwnPropertySymbols) {
        var s = Object.getOwnPropertySymbols(o);
        if (r) s = s.filter(function (x) { return Object.getOwnPropertyDescriptor(o, x).enumerable; });
        k.push.apply(k, s);
      }
      return k;
    }
    for (var r = 1; r < arguments.length; r++) {
      var t = arguments[r] != null ? arguments[r] : {};
      if (r % 2) {
        ownKeys(Object(t), true).forEach(function (k) { babelHelpers.defineProperty(e, k, t[k]); });
      } else if (Object.getOwnPropertyDescriptors) {
        Object.defineProperties(e, Object.getOwnPropertyDescriptors(t));
      } else {
        ownKeys(Object(t)).forEach(function (k) {
          Object.defineProperty(e, k, Object.getOwnPropertyDescriptor(t, k));
        });
      }
    }
    return e;
  }"#,
    },
    Helper {
        name: "extends",
        requires: &[],
        body: r#"function () {
    return Object.assign.apply(Object, [arguments[0]].concat([].slice.call(arguments, 1)));
  }"#,
    },
    Helper {
        name: "objectWithoutProperties",
        requires: &[],
        body: r#"function (e, t) {
    if (e == null) return {};
    var o = {};
    for (var n in e) {
      if ({}.hasOwnProperty.call(e, n) && t.indexOf(n) === -1) o[n] = e[n];
    }
    if (Object.getOwnPropertySymbols) {
      var s = Object.getOwnPropertySymbols(e);
      for (var i = 0; i < s.length; i++) {
        if (t.indexOf(s[i]) === -1 && {}.propertyIsEnumerable.call(e, s[i])) o[s[i]] = e[s[i]];
      }
    }
    return o;
  }"#,
    },
    Helper {
        name: "objectDestructuringEmpty",
        requires: &[],
        body: r#"function (t) {
    if (t == null) throw new TypeError('Cannot destructure ' + t);
  }"#,
    },
    Helper {
        name: "asyncToGenerator",
        requires: &[],
        body: r#"function (n) {
    return function () {
      var t = this, e = arguments;
      return new Promise(function (r, o) {
        var a = n.apply(t, e);
        function step(key, arg) {
          var info;
          try {
            info = a[key](arg);
          } catch (err) {
            o(err);
            return;
          }
          if (info.done) r(info.value);
          else Promise.resolve(info.value).then(_next, _throw);
        }
        function _next(v) { step('next', v); }
        function _throw(v) { step('throw', v); }
        _next(undefined);
      });
    };
  }"#,
    },
    Helper {
        name: "taggedTemplateLiteral",
        requires: &[],
        body: r#"function (e, t) {
    if (!t) t = e.slice(0);
    return Object.freeze(Object.defineProperties(e, { raw: { value: Object.freeze(t) } }));
  }"#,
    },
    Helper {
        name: "assertClassBrand",
        requires: &[],
        body: r#"function (e, t, n) {
    if (typeof e === 'function' ? e === t : e.has(t)) return arguments.length < 3 ? t : n;
    throw new TypeError('Private element is not present on this object');
  }"#,
    },
    Helper {
        name: "classPrivateFieldInitSpec",
        requires: &[],
        body: r#"function (e, t, a) {
    if (t.has(e)) throw new TypeError('Cannot initialize the same private elements twice on an object');
    t.set(e, a);
  }"#,
    },
    Helper {
        name: "classPrivateMethodInitSpec",
        requires: &[],
        body: r#"function (e, a) {
    if (a.has(e)) throw new TypeError('Cannot initialize the same private elements twice on an object');
    a.add(e);
  }"#,
    },
    Helper {
        name: "classPrivateFieldGet2",
        requires: &["assertClassBrand"],
        body: r#"function (s, a) {
    return s.get(babelHelpers.assertClassBrand(s, a));
  }"#,
    },
    Helper {
        name: "classPrivateFieldSet2",
        requires: &["assertClassBrand"],
        body: r#"function (s, a, r) {
    s.set(babelHelpers.assertClassBrand(s, a), r);
    return r;
  }"#,
    },
    Helper {
        name: "checkInRHS",
        requires: &[],
        body: r#"function (e) {
    if (Object(e) !== e) throw new TypeError("right-hand side of 'in' should be an object");
    return e;
  }"#,
    },
    Helper {
        name: "readOnlyError",
        requires: &[],
        body: r#"function (r) {
    throw new TypeError('"' + r + '" is read-only');
  }"#,
    },
    Helper {
        name: "writeOnlyError",
        requires: &[],
        body: r#"function (r) {
    throw new TypeError('"' + r + '" is write-only');
  }"#,
    },
    Helper {
        name: "superPropGet",
        requires: &[],
        body: r#"function (t, o, e, r) {
    var p = Reflect.get(Object.getPrototypeOf(r & 1 ? t.prototype : t), o, e);
    return r & 2 && typeof p === 'function' ? function (a) { return p.apply(e, a); } : p;
  }"#,
    },
    Helper {
        name: "superPropSet",
        requires: &[],
        body: r#"function (t, e, o, r, p, f) {
    if (!Reflect.set(Object.getPrototypeOf(f ? t.prototype : t), e, o, r) && p) {
      throw new TypeError('failed to set property');
    }
    return o;
  }"#,
    },
    Helper {
        name: "toSetter",
        requires: &[],
        body: r#"function (t, e, n) {
    if (!e) e = [];
    var r = e.length++;
    return Object.defineProperty({}, '_', {
      set: function (o) { e[r] = o; t.apply(n, e); }
    });
  }"#,
    },
];

/// Helper names referenced by lowered `code`.
pub fn referenced(code: &str) -> BTreeSet<String> {
    HELPER_CALL
        .captures_iter(code)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// `var babelHelpers = {...};` covering `names` and their dependencies.
///
/// Returns the first helper without a runtime implementation as the error.
pub fn emit(names: &BTreeSet<String>) -> Result<String, String> {
    if names.is_empty() {
        return Ok(String::new());
    }

    let mut needed = BTreeSet::new();
    let mut stack: Vec<&str> = names.iter().map(String::as_str).collect();
    while let Some(name) = stack.pop() {
        let helper = find(name).ok_or_else(|| name.to_string())?;
        if needed.insert(helper.name) {
            stack.extend(helper.requires.iter().copied());
        }
    }

    let mut out = String::from("var babelHelpers = {};\n");
    for helper in HELPERS.iter().filter(|h| needed.contains(h.name)) {
        out.push_str(&format!("babelHelpers.{} = {};\n", helper.name, helper.body));
    }
    Ok(out)
}

fn find(name: &str) -> Option<&'static Helper> {
    HELPERS.iter().find(|h| h.name == name)
}
