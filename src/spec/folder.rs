use crate::formats::xml_escape;

/// A MoM folder grouping observations, pipelines and other folders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Folder {
    pub name: String,
    pub description: Option<String>,
    /// Set to add to an existing MoM folder rather than create a new one.
    pub mom_id: Option<u64>,
    /// Whether MoM should treat the folder as the topology parent of its
    /// children.
    pub grouping_parent: bool,
}

impl Folder {
    pub fn new<S: Into<String>>(name: S) -> Folder {
        Folder {
            name: name.into(),
            ..Folder::default()
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Folder {
        self.description = Some(description.into());
        self
    }

    pub fn with_mom_id(mut self, mom_id: u64) -> Folder {
        self.mom_id = Some(mom_id);
        self
    }

    pub fn with_grouping_parent(mut self, grouping_parent: bool) -> Folder {
        self.grouping_parent = grouping_parent;
        self
    }

    pub(super) fn xml_prefix(&self) -> String {
        let mut attributes = String::new();
        if let Some(id) = self.mom_id {
            attributes.push_str(&format!(" mom2Id=\"{id}\""));
        }
        if self.grouping_parent {
            attributes.push_str(" topology_parent=\"true\"");
        }
        let mut xml = format!(
            "<lofar:folder{attributes}>\n<name>{}</name>",
            xml_escape(&self.name)
        );
        if let Some(description) = &self.description {
            xml.push_str(&format!(
                "\n<description>{}</description>",
                xml_escape(description)
            ));
        }
        xml
    }

    pub(super) fn xml_suffix(&self) -> &'static str {
        "\n</lofar:folder>"
    }
}
