use crate::feed::namespace::{DISPLAY_BLOCK, INNER_BLOCKS};

/// Allow the image and custom field blocks inside the display block.
///
/// Other blocks get their allowlist back unchanged. The result has no
/// duplicates; the first occurrence of each block type keeps its position.
pub fn add_inner_blocks_support(supported: Vec<String>, block_name: &str) -> Vec<String> {
    if block_name != DISPLAY_BLOCK {
        return supported;
    }

    let mut result: Vec<String> = Vec::with_capacity(supported.len() + INNER_BLOCKS.len());
    for block in supported
        .into_iter()
        .chain(INNER_BLOCKS.iter().map(|b| b.to_string()))
    {
        if !result.contains(&block) {
            result.push(block);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(blocks: &[&str]) -> Vec<String> {
        blocks.iter().map(|b| b.to_string()).collect()
    }

    #[test]
    fn test_other_block_unchanged() {
        let input = owned(&["core/heading", "core/heading"]);
        assert_eq!(
            add_inner_blocks_support(input.clone(), "core/group"),
            input
        );
    }

    #[test]
    fn test_adds_both_blocks() {
        let result = add_inner_blocks_support(owned(&["ubc/api-title"]), DISPLAY_BLOCK);
        assert_eq!(
            result,
            owned(&["ubc/api-title", "ubc/api-image", "ubc/api-custom-field"])
        );
    }

    #[test]
    fn test_no_duplicate_when_already_present() {
        let result =
            add_inner_blocks_support(owned(&["ubc/api-image", "ubc/api-excerpt"]), DISPLAY_BLOCK);

        assert_eq!(
            result.iter().filter(|b| *b == "ubc/api-image").count(),
            1
        );
        assert!(result.contains(&"ubc/api-custom-field".to_string()));
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_existing_duplicates_collapsed() {
        let result = add_inner_blocks_support(owned(&["a", "a", "b"]), DISPLAY_BLOCK);
        assert_eq!(
            result,
            owned(&["a", "b", "ubc/api-image", "ubc/api-custom-field"])
        );
    }
}
