//! Whitelist and namespaced list parsers

use crate::document::DocumentParser;
use crate::dto::{NamespacedListDto, NamespacedListsDto, WhitelistDto};
use crate::error::{ParseError, Result};
use redirector_core::{NamespacedList, NamespacedLists, WhiteList};

/// Whitelist parser
pub struct WhitelistParser;

impl WhitelistParser {
    pub fn parse(content: &str) -> Result<WhiteList> {
        let dto: WhitelistDto = DocumentParser::parse(content)?;
        Ok(Self::translate(&dto))
    }

    pub fn translate(dto: &WhitelistDto) -> WhiteList {
        WhiteList::new(dto.paths.iter().cloned()).with_version(dto.version)
    }

    pub fn to_dto(whitelist: &WhiteList) -> WhitelistDto {
        WhitelistDto {
            paths: whitelist.paths.iter().cloned().collect(),
            version: whitelist.version,
        }
    }
}

/// Namespaced lists parser
pub struct NamespacedListsParser;

impl NamespacedListsParser {
    pub fn parse(content: &str) -> Result<NamespacedLists> {
        let dto: NamespacedListsDto = DocumentParser::parse(content)?;
        Self::translate(&dto)
    }

    pub fn translate(dto: &NamespacedListsDto) -> Result<NamespacedLists> {
        let mut lists = NamespacedLists {
            version: dto.version,
            ..Default::default()
        };

        for list in &dto.namespace {
            if list.name.trim().is_empty() {
                return Err(ParseError::MissingField {
                    field: "namespace.name".to_string(),
                });
            }
            if lists.has_list(&list.name) {
                return Err(ParseError::InvalidValue {
                    field: "namespace.name".to_string(),
                    message: format!("duplicate namespaced list '{}'", list.name),
                });
            }
            lists.insert(NamespacedList::new(list.name.clone(), list.value.iter().cloned()));
        }

        Ok(lists)
    }

    pub fn to_dto(lists: &NamespacedLists) -> NamespacedListsDto {
        let mut namespace: Vec<NamespacedListDto> = lists
            .lists
            .values()
            .map(|list| NamespacedListDto {
                name: list.name.clone(),
                value: list.values.iter().cloned().collect(),
            })
            .collect();
        namespace.sort_by(|a, b| a.name.cmp(&b.name));

        NamespacedListsDto {
            version: lists.version,
            namespace,
        }
    }
}
