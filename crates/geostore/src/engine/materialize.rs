use super::{
    convert,
    plan::{ElementOrder, ProjectedKind, ProjectedProperty, QueryPlan},
};
use crate::Result;

use geostore_core::{
    bail,
    driver::Row,
    feature::PropertyValue,
    schema::QName,
    stmt::Value,
    Error, Feature,
};
use indexmap::IndexMap;
use std::sync::Arc;

/// Folds the rows of a plan back into features.
///
/// Rows must arrive grouped by feature id, which the plan's `ORDER BY`
/// guarantees. A feature is complete once a row with a different id
/// arrives, or when [`finish`](Materializer::finish) is called.
#[derive(Debug)]
pub struct Materializer {
    plan: Arc<QueryPlan>,
    pending: Option<Pending>,
}

#[derive(Debug)]
struct Pending {
    id: Value,
    slots: Vec<Slot>,
}

/// The elements collected so far for one property.
#[derive(Debug, Default, Clone)]
struct Slot {
    elements: Vec<Element>,
}

#[derive(Debug, Clone)]
struct Element {
    key: Vec<Value>,
    value: ElementValue,
}

#[derive(Debug, Clone)]
enum ElementValue {
    Value(PropertyValue),
    Record(Vec<Slot>),
}

impl Materializer {
    pub fn new(plan: Arc<QueryPlan>) -> Self {
        Self {
            plan,
            pending: None,
        }
    }

    pub fn plan(&self) -> &QueryPlan {
        &self.plan
    }

    /// Absorbs one row. Returns the previous feature when this row starts a
    /// new one.
    pub fn push_row(&mut self, row: Row) -> Result<Option<Feature>> {
        let plan: &QueryPlan = &self.plan;
        let pending = &mut self.pending;

        if row.len() != plan.columns.len() {
            bail!(
                "result row has {} columns, but {} were selected",
                row.len(),
                plan.columns.len()
            );
        }

        let id = &row[0];
        if id.is_null() {
            bail!("result row without a feature id");
        }

        let same = pending.as_ref().is_some_and(|current| current.id == *id);
        let done = if same {
            None
        } else {
            pending.take().map(|current| complete(plan, current)).transpose()?
        };

        let current = pending.get_or_insert_with(|| Pending {
            id: id.clone(),
            slots: vec![Slot::default(); plan.properties.len()],
        });

        absorb(&plan.properties, &mut current.slots, &row)?;

        Ok(done)
    }

    /// Completes the last feature, if any rows were pushed since the last
    /// one was returned.
    pub fn finish(&mut self) -> Result<Option<Feature>> {
        match self.pending.take() {
            Some(current) => complete(&self.plan, current).map(Some),
            None => Ok(None),
        }
    }
}

fn absorb(properties: &[ProjectedProperty], slots: &mut [Slot], row: &Row) -> Result<()> {
    for (property, slot) in properties.iter().zip(slots) {
        // No match in the outer join
        if property.joined && property.columns.iter().all(|&i| row[i].is_null()) {
            continue;
        }

        let key: Vec<Value> = property.key.iter().map(|&i| row[i].clone()).collect();

        let index = match slot.elements.iter().position(|element| element.key == key) {
            Some(index) => index,
            None => {
                slot.elements.push(Element {
                    key,
                    value: element_value(property, row)?,
                });
                slot.elements.len() - 1
            }
        };

        if let (ProjectedKind::Record(children), ElementValue::Record(child_slots)) =
            (&property.kind, &mut slot.elements[index].value)
        {
            absorb(children, child_slots, row)?;
        }
    }

    Ok(())
}

fn element_value(property: &ProjectedProperty, row: &Row) -> Result<ElementValue> {
    let value = match &property.kind {
        ProjectedKind::Primitive { column, ty } => convert::primitive(&row[*column], *ty)?,
        ProjectedKind::Geometry { column, srid } => convert::geometry(&row[*column], *srid)?,
        ProjectedKind::Reference {
            fk,
            href,
            target,
            prefix,
        } => convert::reference(
            fk.map(|i| &row[i]),
            href.map(|i| &row[i]),
            target.as_ref(),
            prefix,
        )?,
        ProjectedKind::Record(children) => {
            return Ok(ElementValue::Record(vec![Slot::default(); children.len()]))
        }
    };

    Ok(ElementValue::Value(value))
}

fn complete(plan: &QueryPlan, pending: Pending) -> Result<Feature> {
    let key = pending
        .id
        .to_text()
        .ok_or_else(|| Error::type_conversion(&pending.id, "string"))?;

    let mut feature = Feature::new(
        format!("{}{key}", plan.id_prefix),
        plan.feature_type.clone(),
    );
    feature.properties = build(&plan.properties, pending.slots)?;

    Ok(feature)
}

fn build(
    properties: &[ProjectedProperty],
    slots: Vec<Slot>,
) -> Result<IndexMap<QName, PropertyValue>> {
    let mut out = IndexMap::new();

    for (property, slot) in properties.iter().zip(slots) {
        let mut elements = slot.elements;

        if property.order == ElementOrder::Numbered {
            elements.sort_by(|a, b| {
                a.key
                    .iter()
                    .zip(&b.key)
                    .map(|(a, b)| a.sort_cmp(b))
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        let mut values = vec![];
        for element in elements {
            values.push(match (element.value, &property.kind) {
                (ElementValue::Value(value), _) => value,
                (ElementValue::Record(child_slots), ProjectedKind::Record(children)) => {
                    PropertyValue::Record(build(children, child_slots)?)
                }
                (ElementValue::Record(_), _) => {
                    bail!("record element for non-record property `{}`", property.name)
                }
            });
        }

        let value = if property.multi {
            if !property.nillable {
                values.retain(|value| !value.is_nil());
            }

            if values.is_empty() {
                continue;
            }

            PropertyValue::List(values)
        } else {
            match values.into_iter().next() {
                None => continue,
                Some(PropertyValue::Nil) if !property.nillable => continue,
                Some(PropertyValue::Record(record)) if record.is_empty() => {
                    if !property.nillable {
                        continue;
                    }
                    PropertyValue::Nil
                }
                Some(value) => value,
            }
        };

        out.insert(property.name.clone(), value);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{engine::Translator, MetreConverter, Query};

    use geostore_core::schema::{Builder, MappingDocument};

    const MAPPING: &str = r#"{
        "namespaces": { "app": "http://example.com/app" },
        "feature_types": [{
            "name": "app:Parent",
            "table": "parent",
            "id": { "column": "id", "prefix": "P_", "type": "integer" },
            "properties": [{
                "name": "app:child",
                "kind": "primitive",
                "mapping": "label",
                "max_occurs": "unbounded",
                "joins": [{
                    "from": "parent", "to": "child",
                    "from_columns": ["id"], "to_columns": ["parent_id"],
                    "order_columns": ["seq"], "numbered_order": true
                }]
            }]
        }]
    }"#;

    fn materializer() -> Materializer {
        let document: MappingDocument = serde_json::from_str(MAPPING).unwrap();
        let schema = Builder::new().build(&document).unwrap();
        let plan = Translator::new(&schema, &MetreConverter)
            .translate(&Query::new("app:Parent").property("app:child"))
            .unwrap();
        Materializer::new(Arc::new(plan))
    }

    fn row(id: i64, label: &str, seq: i64) -> Row {
        vec![Value::I64(id), Value::from(label), Value::I64(seq)]
    }

    fn children(feature: &Feature) -> Vec<&str> {
        feature
            .get("app:child")
            .and_then(PropertyValue::as_list)
            .unwrap()
            .iter()
            .filter_map(PropertyValue::as_str)
            .collect()
    }

    #[test]
    fn numbered_order_wins_over_arrival_order() {
        let mut materializer = materializer();

        assert!(materializer.push_row(row(1, "c", 2)).unwrap().is_none());
        assert!(materializer.push_row(row(1, "a", 0)).unwrap().is_none());
        assert!(materializer.push_row(row(1, "b", 1)).unwrap().is_none());

        let first = materializer.push_row(row(2, "y", 1)).unwrap().unwrap();
        assert_eq!(first.id, "P_1");
        assert_eq!(children(&first), ["a", "b", "c"]);

        materializer.push_row(row(2, "x", 0)).unwrap();
        let second = materializer.finish().unwrap().unwrap();
        assert_eq!(second.id, "P_2");
        assert_eq!(children(&second), ["x", "y"]);

        assert!(materializer.finish().unwrap().is_none());
    }

    #[test]
    fn unmatched_outer_joins_leave_the_property_out() {
        let mut materializer = materializer();

        materializer
            .push_row(vec![Value::I64(1), Value::Null, Value::Null])
            .unwrap();
        let feature = materializer.finish().unwrap().unwrap();
        assert!(feature.get("app:child").is_none());
    }

    #[test]
    fn rows_must_match_the_projection() {
        let mut materializer = materializer();

        assert!(materializer.push_row(vec![Value::I64(1)]).is_err());
        assert!(materializer
            .push_row(vec![Value::Null, Value::from("a"), Value::I64(0)])
            .is_err());
    }
}
