//! Comprehensive tests for RustyTesseractProvider
//!
//! These tests verify the rusty-tesseract OCR provider implementation including:
//! - Configuration validation
//! - Error handling
//! - Integration with page analysis
//! - Multi-language support
//!
//! Most tests are marked as `#[ignore]` because they require Tesseract to be installed.
//! Run with: `cargo test tesseract_ocr_tests --features ocr-tesseract -- --ignored`

#[cfg(feature = "ocr-tesseract")]
mod tesseract_tests {
    use ocrsandwich_core::graphics::ImageFormat;
    use ocrsandwich_core::text::ocr::{OcrEngine, OcrOptions, OcrProvider};
    use ocrsandwich_core::text::tesseract_provider::{RustyTesseractConfig, RustyTesseractProvider};
    use std::collections::HashMap;
    use std::time::Duration;

    // Helper function to create mock image data
    fn create_mock_jpeg_data() -> Vec<u8> {
        vec![
            0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x01,
            0x00, 0x48, 0x00, 0x48, 0x00, 0x00, 0xFF, 0xDB, 0x00, 0x43, 0x00, 0x08, 0x06, 0x06,
            0x07, 0x06, 0x05, 0x08, 0x07, 0x07, 0x07, 0x09, 0x09, 0x08, 0x0A, 0x0C, 0x14, 0x0D,
            0x0C, 0x0B, 0x0B, 0x0C, 0x19, 0x12, 0x13, 0x0F, 0x14, 0x1D, 0x1A, 0x1F, 0x1E, 0x1D,
            0x1A, 0x1C, 0x1C, 0x20, 0x24, 0x2E, 0x27, 0x20, 0x22, 0x2C, 0x23, 0x1C, 0x1C, 0x28,
            0x37, 0x29, 0x2C, 0x30, 0x31, 0x34, 0x34, 0x34, 0x1F, 0x27, 0x39, 0x3D, 0x38, 0x32,
            0x3C, 0x2E, 0x33, 0x34, 0x32, 0xFF, 0xD9,
        ]
    }

    #[allow(dead_code)]
    fn create_mock_png_data() -> Vec<u8> {
        vec![
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
            0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00,
            0x00, 0x1F, 0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78,
            0x9C, 0x63, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00,
            0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
        ]
    }

    #[test]
    fn test_tesseract_config_defaults() {
        let config = RustyTesseractConfig::default();
        assert_eq!(config.language, "eng");
        assert_eq!(config.psm, Some(3));
        assert_eq!(config.oem, Some(3));
        assert_eq!(config.dpi, Some(300));
        assert!(!config.config_variables.is_empty());
    }

    #[test]
    fn test_tesseract_config_with_language() {
        let config = RustyTesseractConfig {
            language: "spa".to_string(),
            psm: Some(3),
            oem: Some(3),
            dpi: Some(300),
            config_variables: HashMap::new(),
        };
        assert_eq!(config.language, "spa");
        assert_eq!(config.psm, Some(3));
        assert_eq!(config.oem, Some(3));
    }

    #[test]
    fn test_tesseract_config_contracts_preset() {
        let provider = RustyTesseractProvider::for_contracts().expect("Failed to create provider");
        assert_eq!(provider.config().language, "eng");
        assert_eq!(provider.config().psm, Some(1));
        assert_eq!(provider.config().oem, Some(1));
        assert_eq!(provider.config().dpi, Some(300));
    }

    #[test]
    fn test_tesseract_config_modification() {
        let mut config = RustyTesseractConfig::default();
        config.language = "spa".to_string();
        config.dpi = Some(150);

        assert_eq!(config.language, "spa");
        assert_eq!(config.dpi, Some(150));
        assert!(!config.config_variables.is_empty());
    }

    #[test]
    fn test_tesseract_supported_formats() {
        let provider = RustyTesseractProvider::new().expect("Failed to create provider");
        let formats = provider.supported_formats();
        assert!(formats.contains(&ImageFormat::Jpeg));
        assert!(formats.contains(&ImageFormat::Png));
        assert!(formats.contains(&ImageFormat::Tiff));
    }

    #[test]
    #[ignore = "Requires Tesseract installation"]
    fn test_tesseract_availability() {
        assert!(RustyTesseractProvider::test_availability().is_ok());
    }

    #[test]
    #[ignore = "Requires Tesseract installation"]
    fn test_tesseract_provider_creation() {
        let provider = RustyTesseractProvider::new().expect("Failed to create provider");
        assert_eq!(provider.engine_name(), "rusty-tesseract");
        assert_eq!(provider.engine_type(), OcrEngine::Tesseract);

        let formats = provider.supported_formats();
        assert!(formats.contains(&ImageFormat::Jpeg));
        assert!(formats.contains(&ImageFormat::Png));
        assert!(formats.contains(&ImageFormat::Tiff));
    }

    #[test]
    #[ignore = "Requires Tesseract installation"]
    fn test_tesseract_provider_with_config() {
        let config = RustyTesseractConfig {
            language: "eng".to_string(),
            psm: Some(1),
            oem: Some(1),
            dpi: Some(300),
            config_variables: HashMap::new(),
        };
        let provider =
            RustyTesseractProvider::with_config(config).expect("Failed to create provider");

        assert_eq!(provider.config().psm, Some(1));
        assert_eq!(provider.config().oem, Some(1));
    }

    #[test]
    #[ignore = "Requires Tesseract installation and sample image"]
    fn test_tesseract_process_image() {
        let provider = RustyTesseractProvider::new().expect("Failed to create provider");
        let options = OcrOptions::default();

        // Note: This test will fail with mock data but verifies the interface
        let image_data = create_mock_jpeg_data();

        match provider.process_image(&image_data, &options) {
            Ok(result) => {
                // If processing succeeds (unlikely with mock data)
                assert!(!result.text.is_empty());
                assert!(result.confidence >= 0.0 && result.confidence <= 1.0);
                assert_eq!(result.engine_name, "rusty-tesseract");
            }
            Err(e) => {
                // Expected to fail with mock data
                println!("Expected failure with mock data: {}", e);
            }
        }
    }

    #[test]
    #[ignore = "Requires Tesseract installation and O&M contract PDFs"]
    fn test_tesseract_with_real_contract_pdfs() {
        use std::path::Path;

        let home_dir =
            std::env::var("HOME").unwrap_or_else(|_| "/Users/santifdezmunoz".to_string());
        let ocr_dir = format!("{}/Downloads/ocr", home_dir);

        // Test contracts with expected target text
        let test_contracts = vec![
            ("confidential_document_1.pdf", "year1"),
            ("confidential_document_2.pdf", "year2"),
        ];

        let ocr_provider = match RustyTesseractProvider::for_contracts() {
            Ok(provider) => provider,
            Err(e) => {
                println!("⚠️  Cannot create OCR provider: {}", e);
                println!("   Make sure tesseract is installed: brew install tesseract");
                return;
            }
        };

        let mut successful_tests = 0;
        let mut total_pages_processed = 0;

        for (contract_file, expected_text) in &test_contracts {
            let pdf_path = Path::new(&ocr_dir).join(contract_file);

            if !pdf_path.exists() {
                println!("⚠️  Contract PDF not found: {}", contract_file);
                continue;
            }

            println!("\n📄 TESTING CONTRACT: {}", contract_file);
            println!("   🎯 Looking for: \"{}\"", expected_text);
            println!(
                "   📏 Size: {:.2}MB",
                std::fs::metadata(&pdf_path).unwrap().len() as f64 / 1_048_576.0
            );

            match test_contract_ocr(&pdf_path, &ocr_provider, expected_text) {
                Ok((pages_processed, text_found, extracted_text)) => {
                    successful_tests += 1;
                    total_pages_processed += pages_processed;

                    println!("   ✅ SUCCESS!");
                    println!("   📊 Pages processed: {}", pages_processed);
                    println!("   📝 Total text length: {} chars", extracted_text.len());

                    if text_found {
                        println!("   🎉 TARGET FOUND: \"{}\"", expected_text);
                        // Great! We found the target text
                    } else {
                        println!("   ⚠️  Target text not found, but OCR pipeline worked");
                        // This is OK - OCR worked but text might be unclear or rotated
                    }

                    // The key test is that we processed scanned pages without errors
                    assert!(
                        pages_processed > 0,
                        "Should have detected and processed at least one scanned page"
                    );
                }
                Err(e) => {
                    println!("   ❌ FAILED: {}", e);
                    // Don't panic - just log the failure
                }
            }
        }

        println!("\n🏆 TEST SUMMARY");
        println!(
            "   ✅ Successful contracts: {}/{}",
            successful_tests,
            test_contracts.len()
        );
        println!("   📄 Total pages processed: {}", total_pages_processed);

        // Success is defined as being able to process the PDFs and run OCR without errors
        // We don't require finding specific text as PDFs might be rotated/unclear
        if successful_tests > 0 {
            println!(
                "   🎉 OCR PIPELINE WORKS! Successfully processed {} contract(s)",
                successful_tests
            );
        } else if test_contracts.len() == 0 {
            println!("   ⚠️  No test contracts found - ensure PDFs are in ~/Downloads/ocr/");
        } else {
            println!("   ❌ No contracts could be processed - check PDF parsing");
        }

        // The test passes if we can process contracts OR if no contracts are available
        assert!(
            successful_tests > 0 || test_contracts.len() == 0,
            "Should successfully process at least one contract or have no contracts to test"
        );
    }

    // Helper function for testing individual contracts
    fn test_contract_ocr(
        pdf_path: &std::path::Path,
        ocr_provider: &RustyTesseractProvider,
        expected_text: &str,
    ) -> Result<(u32, bool, String), Box<dyn std::error::Error>> {
        use ocrsandwich_core::operations::page_analysis::PageContentAnalyzer;
        use ocrsandwich_core::parser::{PdfDocument, PdfReader};

        // Open the PDF
        let reader = PdfReader::open(pdf_path)?;
        let document = PdfDocument::new(reader);

        // Get page count before moving document
        let page_count = document.page_count().unwrap_or(0);
        println!("   📋 Total pages in PDF: {}", page_count);

        // Create page analyzer (takes ownership of document)
        let analyzer = PageContentAnalyzer::new(document);

        let mut pages_processed = 0;
        let mut all_extracted_text = String::new();
        let mut target_found = false;

        // Don't try to process if the PDF couldn't be parsed properly
        if page_count == 0 {
            return Err("PDF has 0 pages - parsing likely failed".into());
        }

        for page_num in 0..std::cmp::min(page_count as usize, 5) {
            // Limit to first 5 pages for testing
            println!("   🔍 Checking page {} of {}", page_num + 1, page_count);

            // Check if page is scanned
            match analyzer.is_scanned_page(page_num) {
                Ok(is_scanned) => {
                    if is_scanned {
                        println!(
                            "   📄 Page {} is scanned - extracting with OCR",
                            page_num + 1
                        );

                        // Extract text using OCR
                        match analyzer.extract_text_from_scanned_page(page_num, ocr_provider) {
                            Ok(ocr_result) => {
                                pages_processed += 1;
                                let page_text = ocr_result.text;

                                println!(
                                    "   ✅ OCR extracted {} chars (confidence: {:.1}%)",
                                    page_text.len(),
                                    ocr_result.confidence * 100.0
                                );

                                // Check for target text
                                if page_text.contains(expected_text) {
                                    target_found = true;
                                    println!(
                                        "   🎯 FOUND target text on page {}: \"{}\"",
                                        page_num + 1,
                                        expected_text
                                    );
                                }

                                all_extracted_text.push_str(&page_text);
                                all_extracted_text.push('\n');

                                // Show preview of extracted text
                                if !page_text.trim().is_empty() {
                                    let preview = page_text.chars().take(100).collect::<String>();
                                    println!(
                                        "   📖 Preview: \"{}...\"",
                                        preview.replace('\n', " ")
                                    );
                                }
                            }
                            Err(e) => {
                                println!("   ❌ OCR failed on page {}: {}", page_num + 1, e);
                            }
                        }
                    } else {
                        println!("   📝 Page {} is text-based (not scanned)", page_num + 1);
                    }
                }
                Err(e) => {
                    println!("   ❌ Could not analyze page {}: {}", page_num + 1, e);
                }
            }
        }

        Ok((pages_processed, target_found, all_extracted_text))
    }

    #[test]
    #[ignore = "Requires Tesseract installation"]
    fn test_tesseract_timeout_handling() {
        let provider = RustyTesseractProvider::new().expect("Failed to create provider");

        let options = OcrOptions {
            timeout_seconds: 1, // Very short timeout
            ..Default::default()
        };

        let image_data = create_mock_jpeg_data();

        // Test that timeout is respected
        let start = std::time::Instant::now();
        let _ = provider.process_image(&image_data, &options);
        let elapsed = start.elapsed();

        // Should complete within reasonable time (even if it fails)
        assert!(elapsed < Duration::from_secs(5));
    }

    #[test]
    fn test_tesseract_stub_without_feature() {
        // Test that without the feature, appropriate errors are returned
        #[cfg(not(feature = "ocr-tesseract"))]
        {
            let result = RustyTesseractProvider::new();
            assert!(result.is_err());
            assert!(result.unwrap_err().to_string().contains("not available"));

            let result = RustyTesseractProvider::test_availability();
            assert!(result.is_err());
            assert!(result.unwrap_err().to_string().contains("not available"));
        }
    }
}
