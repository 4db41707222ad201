//! The top-level MoM project document.

use itertools::Itertools;
use log::debug;

use crate::{
    formats::{indent, xml_escape},
    spec::{NodeId, SpecificationError, SpecificationTree},
};

const PROJECT_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mom2:project xmlns:lofar="http://www.astron.nl/MoM2-Lofar"
    xmlns:mom2="http://www.astron.nl/MoM2"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://www.astron.nl/MoM2-Lofar http://lofar.astron.nl:8080/mom3/schemas/LofarMoM2.xsd http://www.astron.nl/MoM2 http://lofar.astron.nl:8080/mom3/schemas/MoM2.xsd ">"#;

/// Render `roots` (observations or folders, with everything below them) as a
/// document that can be imported into the MoM project `project`.
pub fn as_xml_mom_project(
    tree: &SpecificationTree,
    roots: &[NodeId],
    project: &str,
) -> Result<String, SpecificationError> {
    debug!("Writing {} top-level item(s) for project '{project}'", roots.len());
    let items = roots
        .iter()
        .map(|&root| {
            let fragment = tree.xml(root, project)?;
            Ok(format!("      <item>\n{}\n      </item>", indent(&fragment, 8)))
        })
        .collect::<Result<Vec<String>, SpecificationError>>()?;

    let project = xml_escape(project);
    Ok(format!(
        "{PROJECT_HEADER}\
         \n    <name>{project}</name>\
         \n    <description>{project}</description>\
         \n    <children>\
         \n{}\
         \n    </children>\
         \n</mom2:project>\n",
        items.iter().join("\n")
    ))
}

#[cfg(test)]
mod tests {
    use hifitime::Epoch;
    use vec1::vec1;

    use super::*;
    use crate::{
        angles::Angle,
        spec::{AntennaSet, Beam, Clock, Folder, FrequencyRange, Observation},
        target::TargetSource,
    };

    fn observation(name: &str) -> Observation {
        let target = TargetSource::new(name, Angle::from_deg(123.4), Angle::from_deg(48.2175))
            .unwrap();
        Observation::new(
            AntennaSet::HbaDualInner,
            FrequencyRange::HbaLow,
            Epoch::from_gregorian_utc_hms(2013, 1, 1, 0, 0, 0),
            600,
            vec!["CS001".to_string()],
            Clock::Mhz200,
            vec1![Beam::new(target, "77..324").unwrap()],
        )
        .unwrap()
    }

    #[test]
    fn test_project_document() {
        let mut tree = SpecificationTree::new();
        let first = tree.add(observation("3C196"));
        let folder = tree.add(Folder::new("Pulsars"));
        tree.add_child(folder, observation("B0329+54")).unwrap();

        let xml = as_xml_mom_project(&tree, &[first, folder], "LC0_001").unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<mom2:project "));
        assert!(xml.contains("xsi:schemaLocation=\"http://www.astron.nl/MoM2-Lofar"));
        assert!(xml.contains("\n    <name>LC0_001</name>\n    <description>LC0_001</description>\n    <children>\n      <item>\n        <lofar:observation>"));
        assert!(xml.contains("        </lofar:observation>\n      </item>\n      <item>\n        <lofar:folder>"));
        assert!(xml.ends_with("        </lofar:folder>\n      </item>\n    </children>\n</mom2:project>\n"));
        assert_eq!(xml.matches("<lofar:observation>").count(), 2);
        assert_eq!(xml.matches("<projectName>LC0_001</projectName>").count(), 2);
    }

    #[test]
    fn test_errors_propagate() {
        let mut tree = SpecificationTree::new();
        let target =
            TargetSource::new("x", Angle::from_deg(0.0), Angle::from_deg(0.0)).unwrap();
        let beam = tree.add(Beam::new(target, "0").unwrap());
        assert!(matches!(
            as_xml_mom_project(&tree, &[beam], "P"),
            Err(SpecificationError::BeamWithoutObservation { .. })
        ));
    }

    #[test]
    fn test_empty_project() {
        let tree = SpecificationTree::new();
        let xml = as_xml_mom_project(&tree, &[], "P").unwrap();
        assert!(xml.contains("<children>\n\n    </children>"));
    }
}
