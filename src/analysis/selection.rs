use super::Error;
use crate::model::metadata::AtomResidueInfo;
use crate::model::system::System;
use crate::model::types::Element;

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    All,
    Name(Vec<String>),
    ResName(Vec<String>),
    ResId(Vec<i32>),
    Chain(Vec<char>),
    Index(Vec<usize>),
    Element(Vec<Element>),
}

#[derive(Debug, Clone, PartialEq)]
struct Term {
    negate: bool,
    predicate: Predicate,
}

/// Returns the indices of atoms matching `query`, in ascending order.
///
/// A query is a list of terms joined by `and`/`or` (`and` binds tighter).
/// Each term is a keyword followed by one or more values, optionally
/// prefixed with `not`:
///
/// | keyword   | matches                       |
/// |-----------|-------------------------------|
/// | `all`     | every atom                    |
/// | `name`    | atom name                     |
/// | `resname` | residue name                  |
/// | `resid`   | residue sequence number       |
/// | `chain`   | chain identifier              |
/// | `index`   | zero-based atom index         |
/// | `element` | element symbol                |
///
/// For example `resname BUT and name C1 C4`.
pub fn select(system: &System, query: &str) -> Result<Vec<usize>, Error> {
    let clauses = parse(query)?;
    let info = system.metadata.as_ref().map(|m| m.atom_info.as_slice());

    let needs_metadata = clauses.iter().flatten().any(|t| {
        matches!(
            t.predicate,
            Predicate::Name(_) | Predicate::ResName(_) | Predicate::ResId(_) | Predicate::Chain(_)
        )
    });
    if needs_metadata && info.is_none() {
        return Err(Error::selection(query, "the structure has no residue metadata"));
    }

    Ok((0..system.atom_count())
        .filter(|&atom| {
            let residue = info.and_then(|i| i.get(atom));
            clauses.iter().any(|clause| {
                clause
                    .iter()
                    .all(|term| term.negate != evaluate(&term.predicate, system, residue, atom))
            })
        })
        .collect())
}

/// Resolves atom names to indices, preserving order.
///
/// A bare name such as `C1` must match exactly one atom. Names shared by
/// several residues can be qualified as `RESNAME:NAME` or `RESID:NAME`.
pub fn find_atoms_by_name(system: &System, names: &[&str]) -> Result<Vec<usize>, Error> {
    let info = system
        .metadata
        .as_ref()
        .map(|m| m.atom_info.as_slice())
        .ok_or_else(|| Error::UnknownAtomName(names.join(",")))?;

    names
        .iter()
        .map(|&spec| {
            let (residue, name) = match spec.split_once(':') {
                Some((residue, name)) => (Some(residue.trim()), name.trim()),
                None => (None, spec.trim()),
            };
            let found: Vec<usize> = info
                .iter()
                .enumerate()
                .filter(|(_, a)| a.atom_name == name)
                .filter(|(_, a)| match residue {
                    None => true,
                    Some(r) => match r.parse::<i32>() {
                        Ok(id) => a.residue_id == id,
                        Err(_) => a.residue_name.eq_ignore_ascii_case(r),
                    },
                })
                .map(|(i, _)| i)
                .collect();

            match found.as_slice() {
                [index] => Ok(*index),
                [] => Err(Error::UnknownAtomName(spec.to_string())),
                _ => Err(Error::AmbiguousAtomName {
                    name: spec.to_string(),
                    count: found.len(),
                }),
            }
        })
        .collect()
}

fn evaluate(
    predicate: &Predicate,
    system: &System,
    residue: Option<&AtomResidueInfo>,
    atom: usize,
) -> bool {
    match predicate {
        Predicate::All => true,
        Predicate::Index(indices) => indices.contains(&atom),
        Predicate::Element(elements) => elements.contains(&system.atoms[atom].element),
        Predicate::Name(names) => residue.is_some_and(|r| names.iter().any(|n| *n == r.atom_name)),
        Predicate::ResName(names) => {
            residue.is_some_and(|r| names.iter().any(|n| n.eq_ignore_ascii_case(&r.residue_name)))
        }
        Predicate::ResId(ids) => residue.is_some_and(|r| ids.contains(&r.residue_id)),
        Predicate::Chain(chains) => residue.is_some_and(|r| chains.contains(&r.chain_id)),
    }
}

fn parse(query: &str) -> Result<Vec<Vec<Term>>, Error> {
    let tokens: Vec<&str> = query.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(Error::selection(query, "empty selection"));
    }

    let mut clauses = Vec::new();
    for clause_tokens in tokens.split(|t| t.eq_ignore_ascii_case("or")) {
        let mut clause = Vec::new();
        for term_tokens in clause_tokens.split(|t| t.eq_ignore_ascii_case("and")) {
            clause.push(parse_term(query, term_tokens)?);
        }
        clauses.push(clause);
    }
    Ok(clauses)
}

fn parse_term(query: &str, tokens: &[&str]) -> Result<Term, Error> {
    let (negate, tokens) = match tokens.split_first() {
        Some((first, rest)) if first.eq_ignore_ascii_case("not") => (true, rest),
        _ => (false, tokens),
    };
    let Some((keyword, values)) = tokens.split_first() else {
        return Err(Error::selection(query, "missing keyword next to 'and'/'or'/'not'"));
    };

    let keyword = keyword.to_ascii_lowercase();
    if keyword == "all" {
        if !values.is_empty() {
            return Err(Error::selection(query, "'all' takes no values"));
        }
        return Ok(Term {
            negate,
            predicate: Predicate::All,
        });
    }
    if values.is_empty() {
        return Err(Error::selection(query, format!("'{}' needs a value", keyword)));
    }

    let strings = || -> Vec<String> { values.iter().map(|v| v.to_string()).collect() };
    let predicate = match keyword.as_str() {
        "name" => Predicate::Name(strings()),
        "resname" => Predicate::ResName(strings()),
        "resid" => Predicate::ResId(parse_values(query, values)?),
        "index" => Predicate::Index(parse_values(query, values)?),
        "element" => Predicate::Element(parse_values(query, values)?),
        "chain" => Predicate::Chain(
            values
                .iter()
                .map(|v| {
                    let mut chars = v.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => Ok(c),
                        _ => Err(Error::selection(
                            query,
                            format!("chain must be one character, got '{}'", v),
                        )),
                    }
                })
                .collect::<Result<_, _>>()?,
        ),
        other => {
            return Err(Error::selection(query, format!("unknown keyword '{}'", other)));
        }
    };

    Ok(Term { negate, predicate })
}

fn parse_values<T: std::str::FromStr>(query: &str, values: &[&str]) -> Result<Vec<T>, Error> {
    values
        .iter()
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| Error::selection(query, format!("invalid value '{}'", v)))
        })
        .collect()
}
